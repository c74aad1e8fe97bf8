#![allow(clippy::unwrap_used, reason = "Fine in tests")]
use std::sync::{Arc, Mutex};

use folio_commonmark::{
  MarkdownOptions,
  MarkdownProcessor,
  SnippetFetcher,
  codeblock::FetchError,
};

/// Records requested URLs and serves canned bodies.
#[derive(Default)]
struct RecordingFetcher {
  requests: Mutex<Vec<String>>,
}

impl SnippetFetcher for RecordingFetcher {
  fn fetch(
    &self,
    owner: &str,
    repo: &str,
    commit: &str,
    path: &str,
  ) -> Result<String, FetchError> {
    self
      .requests
      .lock()
      .unwrap()
      .push(format!("{owner}/{repo}/{commit}/{path}"));
    Ok(format!("fn {}() {{}}\n", path.replace(['/', '.'], "_")))
  }
}

#[test]
fn github_files_go_through_the_fetcher() {
  let fetcher = Arc::new(RecordingFetcher::default());
  let processor = MarkdownProcessor::new(MarkdownOptions::default())
    .with_fetcher(Arc::clone(&fetcher) as Arc<dyn SnippetFetcher>);

  let markdown = r#"```github
{
  "repo": "hana/spiro",
  "commit": "deadbeef",
  "files": [
    { "file": "src/lib.rs" },
    { "file": "src/main.rs", "entryFile": true, "foldRanges": [[1, 2]] }
  ]
}
```
"#;
  let result = processor.render(markdown);

  let mut requests = fetcher.requests.lock().unwrap().clone();
  requests.sort();
  assert_eq!(requests, vec![
    "hana/spiro/deadbeef/src/lib.rs",
    "hana/spiro/deadbeef/src/main.rs"
  ]);

  let html = &result.html;
  assert!(html.contains("fn src_lib_rs() {}"));
  assert!(html.contains("data-fold-ranges=\"1-2\""));
  // The entry file is selected and the tree is shown for nested paths.
  assert!(html.contains("class=\"code-tree\""));
  assert!(html.contains("class=\"code-tree-file active\" data-target=\"1\""));
}
