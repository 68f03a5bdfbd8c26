use smallvec::SmallVec;
use std::fmt;

/// Path of the node a validation run is currently visiting, rendered as
/// `Condition.stage[0].assessment[1]`.
#[derive(Debug, Clone, Default)]
pub struct LocationContext {
    root: String,
    segments: SmallVec<[Segment; 8]>,
}

#[derive(Debug, Clone)]
struct Segment {
    name: String,
    index: Option<usize>,
}

impl LocationContext {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: SmallVec::new(),
        }
    }

    pub fn push(&mut self, name: &str, index: Option<usize>) {
        self.segments.push(Segment {
            name: name.to_string(),
            index,
        });
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of a child property of the current node, without descending.
    pub fn child(&self, name: &str) -> String {
        format!("{self}.{name}")
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, ".{}", segment.name)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_indexed_segments() {
        let mut location = LocationContext::new("Condition");
        location.push("stage", Some(0));
        location.push("assessment", Some(1));
        assert_eq!(location.path(), "Condition.stage[0].assessment[1]");
        assert_eq!(location.child("reference"), "Condition.stage[0].assessment[1].reference");

        location.pop();
        location.pop();
        assert_eq!(location.path(), "Condition");
        assert_eq!(location.depth(), 0);
    }
}
