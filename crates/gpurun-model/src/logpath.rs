use std::path::PathBuf;

use crate::job::JobContext;

/// Log file path pattern with scheduler-style escapes.
///
/// Supported escapes, matching the scheduler's own output-file templating:
/// - `%j` — job id
/// - `%x` — job name
/// - `%N` — node name
/// - `%%` — literal `%`
///
/// Escapes whose value is missing from the [`JobContext`] expand to the
/// empty string; unknown escapes are kept verbatim so a pattern survives a
/// round trip through expansion unsurprised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPattern(String);

impl LogPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand the pattern against a job context.
    pub fn expand(&self, ctx: &JobContext) -> PathBuf {
        let mut out = String::with_capacity(self.0.len());
        let mut chars = self.0.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('j') => out.push_str(ctx.job_id.as_deref().unwrap_or("")),
                Some('x') => out.push_str(ctx.job_name.as_deref().unwrap_or("")),
                Some('N') => out.push_str(ctx.node_name.as_deref().unwrap_or("")),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }

        PathBuf::from(out)
    }
}

impl From<&str> for LogPattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::LogPattern;
    use crate::job::JobContext;
    use std::path::PathBuf;

    fn ctx() -> JobContext {
        JobContext {
            job_id: Some("123456".to_string()),
            job_name: Some("train".to_string()),
            node_name: Some("hgx-07".to_string()),
            gpus_per_node: None,
        }
    }

    #[test]
    fn expands_job_id_and_name() {
        let p = LogPattern::new("logs/%x-%j.out");
        assert_eq!(p.expand(&ctx()), PathBuf::from("logs/train-123456.out"));
    }

    #[test]
    fn expands_node_name_and_literal_percent() {
        let p = LogPattern::new("%N/%x-100%%.log");
        assert_eq!(p.expand(&ctx()), PathBuf::from("hgx-07/train-100%.log"));
    }

    #[test]
    fn missing_values_expand_to_empty() {
        let p = LogPattern::new("logs/%x-%j.out");
        let empty = JobContext::default();
        assert_eq!(p.expand(&empty), PathBuf::from("logs/-.out"));
    }

    #[test]
    fn unknown_escapes_are_preserved() {
        let p = LogPattern::new("logs/%q-%j");
        assert_eq!(p.expand(&ctx()), PathBuf::from("logs/%q-123456"));
    }

    #[test]
    fn trailing_percent_is_kept() {
        let p = LogPattern::new("logs/out%");
        assert_eq!(p.expand(&ctx()), PathBuf::from("logs/out%"));
    }
}
