//! Numbered console menu over a [`ChartSource`].

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::catalog::{ChartSource, RenderParams};
use crate::error::Result;
use crate::figure::Figure;

/// Menu choices 1 to 11, in order.
pub const MENU: [(&str, &str); 11] = [
    ("age_distribution", "Age Distribution"),
    ("bmi_distribution", "BMI Distribution"),
    ("sleep_distribution", "Sleep Distribution"),
    ("heatmap", "Correlation Heatmap"),
    ("bmi_by_gender", "BMI by Gender"),
    ("steps_vs_bmi", "Daily Steps vs BMI"),
    ("pairplot", "Pairplot"),
    ("facetgrid_steps_vs_bmi", "Steps vs BMI by Gender (FacetGrid)"),
    ("bmi_vs_age", "BMI vs Age (Regression)"),
    ("alcohol_vs_heart_rate", "Alcohol vs Heart Rate"),
    ("exercise_by_smoker", "Exercise by Smoker Status"),
];

pub const EXIT_CHOICE: usize = MENU.len() + 1;

pub fn show_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "===== Health Data Visualization Menu =====")?;
    for (number, (_, label)) in MENU.iter().enumerate() {
        writeln!(out, "{:>2}. {}", number + 1, label)?;
    }
    writeln!(out, "{:>2}. Exit", EXIT_CHOICE)?;
    Ok(())
}

/// Reads choices until the exit choice or end of input. Each chosen figure
/// goes to `display`; failures are reported and the menu continues.
pub fn run_menu<S, R, W, F>(source: &S, mut input: R, out: &mut W, mut display: F) -> io::Result<()>
where
    S: ChartSource + ?Sized,
    R: BufRead,
    W: Write,
    F: FnMut(&str, &Figure) -> Result<()>,
{
    loop {
        show_menu(out)?;
        write!(out, "Enter your choice (1-{}): ", EXIT_CHOICE)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match line.trim().parse::<usize>() {
            Ok(EXIT_CHOICE) => {
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            Ok(choice) if (1..EXIT_CHOICE).contains(&choice) => {
                let (name, _) = MENU[choice - 1];
                let shown = source
                    .render(name, &RenderParams::default())
                    .and_then(|figure| display(name, &figure));
                if let Err(err) = shown {
                    warn!("Chart {} failed: {}", name, err);
                    writeln!(out, "Could not show {}: {}", name, err)?;
                }
            }
            _ => writeln!(out, "Invalid choice. Try again.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::VizError;
    use crate::fixtures::sample_dataset;
    use std::io::Cursor;

    fn run(input: &str, display: impl FnMut(&str, &Figure) -> Result<()>) -> (String, usize) {
        let dataset = sample_dataset(12);
        let catalog = Catalog::new(&dataset);
        let mut out = Vec::new();
        let mut shown = 0;
        let mut display = display;
        run_menu(&catalog, Cursor::new(input), &mut out, |name, figure| {
            shown += 1;
            display(name, figure)
        })
        .unwrap();
        (String::from_utf8(out).unwrap(), shown)
    }

    #[test]
    fn test_menu_lists_all_choices() {
        let mut out = Vec::new();
        show_menu(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" 1. Age Distribution"));
        assert!(text.contains("11. Exercise by Smoker Status"));
        assert!(text.contains("12. Exit"));
    }

    #[test]
    fn test_invalid_choices_then_exit() {
        let (text, shown) = run("0\nabc\n13\n12\n", |_, _| Ok(()));
        assert_eq!(text.matches("Invalid choice. Try again.").count(), 3);
        assert!(text.ends_with("Goodbye!\n"));
        assert_eq!(shown, 0);
    }

    #[test]
    fn test_choice_renders_named_chart() {
        let mut names = Vec::new();
        let (text, shown) = run("4\n 1 \n12\n", |name, _| {
            names.push(name.to_string());
            Ok(())
        });
        assert_eq!(shown, 2);
        assert_eq!(names, vec!["heatmap", "age_distribution"]);
        assert!(!text.contains("Invalid choice"));
    }

    #[test]
    fn test_failure_returns_to_menu() {
        let (text, shown) = run("2\n3\n12\n", |name, _| {
            if name == "bmi_distribution" {
                Err(VizError::Render("backend unavailable".to_string()))
            } else {
                Ok(())
            }
        });
        assert_eq!(shown, 2);
        assert!(text.contains("Could not show bmi_distribution"));
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn test_end_of_input_stops() {
        let (text, shown) = run("1\n", |_, _| Ok(()));
        assert_eq!(shown, 1);
        assert!(!text.contains("Goodbye!"));
    }
}
