use thiserror::Error;

pub type HenonResult<T> = Result<T, HenonError>;

/// Failures surfaced by the numerical cores and the table reader.
///
/// Divergence of an orbit is not represented here; it is an outcome carried by
/// `Orbit::Diverged`, `Estimate::Undefined` and `CellOutcome::Diverged`.
#[derive(Debug, Error)]
pub enum HenonError {
    /// A zero-norm vector showed up during projection or orthogonalization.
    #[error("Degenerate geometry: vector {index} collapsed{}", step_suffix(.step))]
    DegenerateGeometry { step: Option<usize>, index: usize },

    /// Caller handed in inputs that violate an API precondition.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Persisted table text that cannot be parsed.
    #[error("Malformed table data at line {line}{}: {reason}", table_suffix(.table))]
    Malformed {
        line: usize,
        table: Option<usize>,
        reason: String,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

fn step_suffix(step: &Option<usize>) -> String {
    step.map(|s| format!(" at step {s}")).unwrap_or_default()
}

fn table_suffix(table: &Option<usize>) -> String {
    table.map(|t| format!(" (table {t})")).unwrap_or_default()
}

impl HenonError {
    pub fn degenerate(index: usize) -> Self {
        HenonError::DegenerateGeometry { step: None, index }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        HenonError::Precondition(message.into())
    }

    pub fn malformed(line: usize, table: Option<usize>, reason: impl Into<String>) -> Self {
        HenonError::Malformed {
            line,
            table,
            reason: reason.into(),
        }
    }

    /// Attach the iteration step to a degenerate-geometry error raised deep in the kernel.
    pub fn at_step(self, step: usize) -> Self {
        match self {
            HenonError::DegenerateGeometry { index, .. } => HenonError::DegenerateGeometry {
                step: Some(step),
                index,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_error() {
        let err = HenonError::degenerate(1);
        assert_eq!(format!("{}", err), "Degenerate geometry: vector 1 collapsed");
        let err = err.at_step(42);
        assert_eq!(
            format!("{}", err),
            "Degenerate geometry: vector 1 collapsed at step 42"
        );
    }

    #[test]
    fn test_precondition_error() {
        let err = HenonError::precondition("frame shapes differ");
        assert_eq!(format!("{}", err), "Precondition violated: frame shapes differ");
    }

    #[test]
    fn test_malformed_error() {
        let err = HenonError::malformed(7, Some(2), "expected 4 columns, found 3");
        assert_eq!(
            format!("{}", err),
            "Malformed table data at line 7 (table 2): expected 4 columns, found 3"
        );
        let err = HenonError::malformed(1, None, "data before any TABLE header");
        assert_eq!(
            format!("{}", err),
            "Malformed table data at line 1: data before any TABLE header"
        );
    }

    #[test]
    fn test_at_step_leaves_other_variants_alone() {
        let err = HenonError::precondition("n must be positive").at_step(3);
        assert!(matches!(err, HenonError::Precondition(_)));
    }
}
