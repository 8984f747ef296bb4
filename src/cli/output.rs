//! Handles all user-facing console output of a run.
//!
//! Everything here renders a [`ReportModel`]; nothing reads the registry directly. The
//! printers are generic over [`WriteColor`] so the runner hands them a colored stdout and
//! the tests hand them a `NoColor` buffer.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::model::Verdict;
use crate::report::{ReportModel, StepReport, SummaryState, Totals};

/// Colors only when stdout is a terminal.
pub fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice())
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// One line per testcase: verdict mark, path and elapsed time.
pub fn print_testcases<W: WriteColor>(out: &mut W, model: &ReportModel) -> io::Result<()> {
    for suite in &model.suites {
        for tc in &suite.testcases {
            let (mark, color) = match tc.verdict {
                Verdict::Ok => ("✓", Color::Green),
                Verdict::Fail => ("✗", Color::Red),
                Verdict::Disabled => ("-", Color::Yellow),
            };
            out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            write!(out, "{}", mark)?;
            out.reset()?;
            match tc.verdict {
                Verdict::Disabled => writeln!(out, " {} (DISABLED)", tc.path)?,
                _ => writeln!(out, " {} ({})", tc.path, tc.elapsed)?,
            }
        }
    }
    Ok(())
}

/// Details of every reported failing teststep.
pub fn print_failures<W: WriteColor>(out: &mut W, model: &ReportModel) -> io::Result<()> {
    for suite in &model.suites {
        for tc in &suite.testcases {
            for step in tc.steps.iter().filter(|s| !s.ok) {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "FAIL")?;
                out.reset()?;
                writeln!(out, ": {} {} [{}]", tc.path, step.id, step.location)?;
                print_step_detail(out, step)?;
            }
        }
    }
    Ok(())
}

/// The closing summary, including the degenerate states and the OK/BAD banner.
pub fn print_summary<W: WriteColor>(out: &mut W, model: &ReportModel) -> io::Result<()> {
    writeln!(out, "\nSUMMARY: ==========================")?;
    if let Some(title) = &model.title {
        writeln!(out, "  title: {}", title)?;
    }
    writeln!(out, "  test suites:")?;

    let state = model.summary_state();
    if state == SummaryState::NoSuites {
        return bad(out, "NO suites registered...");
    }
    writeln!(out, "    exec'd  : \t{}", model.suites_total.total)?;
    print_ok_fail(out, &model.suites_total)?;

    writeln!(out, "\n  test cases:")?;
    if state == SummaryState::AllDisabled {
        return bad(out, "ALL testcases were DISABLED...");
    }
    let tcs = &model.testcases_total;
    writeln!(
        out,
        "    exec'd  : \t{}\t{}",
        tcs.executed,
        pct(crate::report::percent(tcs.executed, tcs.total))
    )?;
    writeln!(out, "    disabled: \t{}\t{}", tcs.disabled, pct(tcs.disabled_percent))?;
    print_ok_fail(out, tcs)?;

    writeln!(out, "\n  test steps:")?;
    if state == SummaryState::NoSteps {
        return bad(out, "NO teststeps were exec'd...");
    }
    writeln!(out, "    exec'd  : \t{}", model.steps_total.executed)?;
    print_ok_fail(out, &model.steps_total)?;
    writeln!(out, "  elapsed : \t{}", model.elapsed)?;

    if model.has_failures() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        writeln!(out, "=====================================")?;
        writeln!(out, "======  B A D  ======================")?;
        write!(out, "=====================================")?;
    } else {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "======  O K  ========================")?;
    }
    out.reset()?;
    writeln!(out)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_step_detail<W: WriteColor>(out: &mut W, step: &StepReport) -> io::Result<()> {
    if !step.description.is_empty() {
        writeln!(out, "  Description: {}", step.description)?;
    }
    writeln!(out, "  Message: {}", step.message)?;
    if !step.what.is_empty() {
        writeln!(out, "  What: {}", step.what)?;
    }
    if step.expected != step.actual && !(step.expected.is_empty() && step.actual.is_empty()) {
        writeln!(out, "  Diff:")?;
        let changeset = Changeset::new(&step.expected, &step.actual, "\n");
        print_diff(out, &changeset.diffs)?;
    }
    Ok(())
}

fn print_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                writeln!(out, "    {}", x)?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "  - expected: {}", x)?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "  + actual:   {}", x)?;
            }
        }
    }
    out.reset()
}

fn print_ok_fail<W: Write>(out: &mut W, totals: &Totals) -> io::Result<()> {
    writeln!(out, "     OK     : \t{}\t{}", totals.ok, pct(totals.ok_percent))?;
    writeln!(out, "     FAILED : \t{}\t{}", totals.fail, pct(totals.fail_percent))
}

fn bad<W: WriteColor>(out: &mut W, what: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "BAD: {}", what)?;
    out.reset()?;
    writeln!(out)
}

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}%", v.trunc()),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::test_case;
    use termcolor::NoColor;

    fn render(registry: &mut Registry, f: fn(&mut NoColor<Vec<u8>>, &ReportModel) -> io::Result<()>) -> String {
        registry.exec().unwrap();
        registry.gen_statistics().unwrap();
        let model = ReportModel::build(registry, false);
        let mut out = NoColor::new(Vec::new());
        f(&mut out, &model).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn summary_without_suites_is_bad() {
        let text = render(&mut Registry::new(), print_summary);
        assert!(text.contains("BAD: NO suites registered..."));
        assert!(!text.contains("test cases:"));
    }

    #[test]
    fn summary_with_only_disabled_testcases() {
        let mut registry = Registry::new();
        registry
            .subscribe(test_case!("/S/t/DISABLE", "", |_t| Ok(())))
            .unwrap();
        let text = render(&mut registry, print_summary);
        assert!(text.contains("BAD: ALL testcases were DISABLED..."));
    }

    #[test]
    fn summary_banner_follows_testcase_failures() {
        let mut good = Registry::new();
        good.subscribe(test_case!("/S/t", "", |t| {
            t.is_true(true);
            Ok(())
        }))
        .unwrap();
        let text = render(&mut good, print_summary);
        assert!(text.contains("======  O K  "));
        assert!(text.contains("     OK     : \t1\t100%"));

        let mut failing = Registry::new();
        failing
            .subscribe(test_case!("/S/t", "", |t| {
                t.is_true(false);
                Ok(())
            }))
            .unwrap();
        let text = render(&mut failing, print_summary);
        assert!(text.contains("B A D"));
    }

    #[test]
    fn failures_show_a_diff() {
        let mut registry = Registry::new();
        registry
            .subscribe(test_case!("/S/t", "adds", |t| {
                t.equal(4, 5);
                Ok(())
            }))
            .unwrap();
        let text = render(&mut registry, print_failures);
        assert!(text.contains("FAIL: /S/t TS-001"));
        assert!(text.contains("  - expected: 5"));
        assert!(text.contains("  + actual:   4"));
    }

    #[test]
    fn testcase_lines_mark_verdicts() {
        let mut registry = Registry::new();
        registry
            .subscribe(test_case!("/S/off/DISABLE", "", |_t| Ok(())))
            .unwrap();
        registry.subscribe(test_case!("/S/on", "", |_t| Ok(()))).unwrap();
        let text = render(&mut registry, print_testcases);
        assert!(text.contains("- /S/off/DISABLE (DISABLED)"));
        assert!(text.contains("✓ /S/on ("));
    }
}
