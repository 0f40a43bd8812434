// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Extra asserts to make tests shorter / more readable.

/// Asserts the exact set of files below a `TestDir`, ignoring the manifest.
#[macro_export]
macro_rules! assert_dir {
  ($dir:expr, [$($path:literal),* $(,)?]) => {{
    let actual = $dir
      .files()
      .into_iter()
      .filter(|p| {
        !p.file_name()
          .is_some_and(|n| n.to_string_lossy().starts_with($crate::config::constants::MANIFEST_FILE))
      })
      .collect::<std::collections::HashSet<std::path::PathBuf>>();
    let expected = std::collections::HashSet::<std::path::PathBuf>::from([$($dir.get_path($path)),*]);

    assert!(
      actual == expected,
      "Directory contents do not match:\nActual:   {actual:#?}\nExpected: {expected:#?}"
    );
  }}
}

#[macro_export]
macro_rules! assert_err {
  ($res:expr, $msg:literal) => {{
    let Err(e) = $res else {
      panic!("Unexpected `Ok`.");
    };
    let e = e.to_string();

    assert!(
      e.contains($msg),
      "Error message did not contain expected substring.\nActual:\n{e}\nExpected:\n{}",
      $msg
    );
  }};
}
