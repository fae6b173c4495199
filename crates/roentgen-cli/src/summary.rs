use console::Style;
use roentgen_core::filters::FilterKind;
use roentgen_core::processing::FilterSettings;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_filter_summary(
    input: &std::path::Path,
    output: &std::path::Path,
    settings: &FilterSettings,
    brightness: Option<f32>,
    contrast: Option<f32>,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Roentgen Filter Chain"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();

    for kind in FilterKind::chain_order() {
        let intensity = settings.intensity_for(kind);
        if intensity > 0.0 {
            println!(
                "  {:<20}{}",
                s.label.apply_to(kind.label()),
                s.value.apply_to(format!("{:.0}%", intensity * 100.0))
            );
        } else {
            println!(
                "  {:<20}{}",
                s.label.apply_to(kind.label()),
                s.disabled.apply_to("disabled")
            );
        }
    }

    if brightness.is_some() || contrast.is_some() {
        println!();
        if let Some(b) = brightness {
            println!(
                "  {:<20}{}",
                s.label.apply_to("Brightness"),
                s.value.apply_to(format!("{:.0}%", b * 100.0))
            );
        }
        if let Some(c) = contrast {
            println!(
                "  {:<20}{}",
                s.label.apply_to("Contrast"),
                s.value.apply_to(format!("{:.0}%", c * 100.0))
            );
        }
    }
    println!();
}
