//! Result lines on stderr. Stdout may carry PNG bytes.

use std::time::Duration;

/// What one comparison came to.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Match {
        total_pixels: u64,
    },
    Differ {
        diff_pixels: u64,
        total_pixels: u64,
        score: f64,
    },
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },
}

impl Outcome {
    /// Process exit code: 0 for a match, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Match { .. } => 0,
            _ => 1,
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

pub fn format_line(name: &str, outcome: &Outcome, elapsed: Duration) -> String {
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(elapsed));

    match outcome {
        Outcome::Match { total_pixels } => {
            format!("  \x1b[32mPASS\x1b[0m  {name}  (0 of {total_pixels} pixels){time_suffix}")
        }
        Outcome::Differ {
            diff_pixels,
            total_pixels,
            score,
        } => format!(
            "  \x1b[31mFAIL\x1b[0m  {name}  ({diff_pixels} of {total_pixels} pixels, {score:.4}){time_suffix}"
        ),
        Outcome::DimensionMismatch {
            left: (lw, lh),
            right: (rw, rh),
        } => format!(
            "  \x1b[31mFAIL\x1b[0m  {name}  (dimensions differ: {lw}x{lh} vs {rw}x{rh}){time_suffix}"
        ),
    }
}

/// Print a single comparison result line.
pub fn print_line(name: &str, outcome: &Outcome, elapsed: Duration) {
    eprintln!("{}", format_line(name, outcome, elapsed));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn lines() {
        let t = Duration::from_millis(3);
        let pass = format_line("a vs b", &Outcome::Match { total_pixels: 100 }, t);
        assert!(pass.contains("PASS"));
        assert!(pass.contains("(0 of 100 pixels)"));

        let fail = format_line(
            "a vs b",
            &Outcome::Differ {
                diff_pixels: 5,
                total_pixels: 100,
                score: 0.05,
            },
            t,
        );
        assert!(fail.contains("FAIL"));
        assert!(fail.contains("(5 of 100 pixels, 0.0500)"));

        let size = format_line(
            "a vs b",
            &Outcome::DimensionMismatch {
                left: (2, 3),
                right: (4, 5),
            },
            t,
        );
        assert!(size.contains("dimensions differ: 2x3 vs 4x5"));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Match { total_pixels: 0 }.exit_code(), 0);
        let differ = Outcome::Differ {
            diff_pixels: 1,
            total_pixels: 1,
            score: 1.0,
        };
        assert_eq!(differ.exit_code(), 1);
    }
}
