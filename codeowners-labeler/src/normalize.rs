/// Rewrite a CODEOWNERS pattern into the glob used for matching.
///
/// - Patterns starting with `*` get a `**/` prefix so they match at any depth.
/// - Patterns ending with `/` get a `**` suffix so they match everything
///   beneath the directory.
/// - Otherwise, if the final path segment has no `.`, the pattern is assumed
///   to name a directory and gets a `/**` suffix. This is a naming heuristic
///   rather than a filesystem check, so a file called `Makefile` is treated as
///   a directory.
///
/// The prefix and suffix steps are independent: `*build/` becomes
/// `**/*build/**`. Normalizing an already normalized pattern returns it
/// unchanged.
pub fn normalize(pattern: &str) -> String {
    let mut glob = if pattern.starts_with('*') && !pattern.starts_with("**/") {
        format!("**/{}", pattern)
    } else {
        pattern.to_owned()
    };

    if glob.ends_with('/') {
        // `foo//` collapses to `foo/**`
        glob.truncate(glob.trim_end_matches('/').len());
        glob.push_str("/**");
        return glob;
    }

    let last_segment = glob.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    if !last_segment.contains('.') && last_segment != "**" {
        glob.push_str("/**");
    }
    glob
}
