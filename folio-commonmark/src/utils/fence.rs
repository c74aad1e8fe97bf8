/// Tracks whether a line-by-line scan is inside a fenced code block.
///
/// A fence opens on a line whose trimmed form starts with three or more
/// backticks or tildes. It only closes on a fence of the same character that
/// is at least as long as the opener, so a ```` fence may contain ``` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  open: Option<(char, usize)>,
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self { open: None }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.open.is_some()
  }

  /// Feed one line to the tracker.
  ///
  /// Returns `true` when the line is a fence marker that opened or closed a
  /// block. Marker lines belong to neither the prose nor the code.
  pub fn observe(&mut self, line: &str) -> bool {
    let Some((fence_char, count)) = fence_marker(line) else {
      return false;
    };

    match self.open {
      None => {
        self.open = Some((fence_char, count));
        true
      },
      Some((open_char, open_count))
        if open_char == fence_char && count >= open_count =>
      {
        self.open = None;
        true
      },
      // A shorter or different fence inside an open block is just code.
      Some(_) => false,
    }
  }
}

/// Returns the fence character and run length if `line` starts a fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
  let trimmed = line.trim();
  let first = trimmed.chars().next()?;
  if first != '`' && first != '~' {
    return None;
  }
  let count = trimmed.chars().take_while(|&c| c == first).count();
  (count >= 3).then_some((first, count))
}

#[cfg(test)]
mod tests {
  use super::FenceTracker;

  #[test]
  fn toggles_on_matching_fences() {
    let mut tracker = FenceTracker::new();
    assert!(tracker.observe("```rust"));
    assert!(tracker.in_code_block());
    assert!(!tracker.observe("# not a heading"));
    assert!(tracker.observe("```"));
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn longer_opener_ignores_shorter_fence() {
    let mut tracker = FenceTracker::new();
    tracker.observe("````markdown");
    assert!(!tracker.observe("```"));
    assert!(tracker.in_code_block());
    assert!(tracker.observe("````"));
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn tilde_fence_is_not_closed_by_backticks() {
    let mut tracker = FenceTracker::new();
    tracker.observe("~~~");
    tracker.observe("```");
    assert!(tracker.in_code_block());
    tracker.observe("~~~");
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn indented_fence_counts() {
    let mut tracker = FenceTracker::new();
    assert!(tracker.observe("   ```toml"));
    assert!(tracker.in_code_block());
  }
}
