use std::fmt;

const ROOT: &str = "/";

/// Directory on the service, as segments starting with the root marker `/`.
///
/// The root segment is never removed, so `..` at the top stays at `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPath {
    segments: Vec<String>,
}

impl Default for DirPath {
    fn default() -> Self {
        Self::root()
    }
}

impl DirPath {
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT.to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Resolves `path` against this directory. Absolute paths start over
    /// from the root.
    pub fn resolve(&self, path: &str) -> DirPath {
        let mut resolved = if path.starts_with('/') {
            DirPath::root()
        } else {
            self.clone()
        };
        for part in path.split('/').filter(|p| !p.is_empty()) {
            match part {
                "." => {}
                ".." => {
                    if !resolved.is_root() {
                        resolved.segments.pop();
                    }
                }
                name => resolved.segments.push(name.to_string()),
            }
        }
        resolved
    }

    /// Renders a resolved argument value.
    ///
    /// Directory form (trailing `/`) is kept when the input named a
    /// directory: empty, ending in `/`, or ending in `.` or `..`.
    pub fn render_argument(&self, input: &str) -> String {
        let resolved = self.resolve(input);
        let last = input.rsplit('/').next().unwrap_or_default();
        if resolved.is_root() || input.is_empty() || matches!(last, "" | "." | "..") {
            resolved.to_string()
        } else {
            resolved.to_string().trim_end_matches('/').to_string()
        }
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.segments[1..] {
            write!(f, "{}/", segment)?;
        }
        Ok(())
    }
}
