//! Single-file classification.

/// Extensions that mark a subpath as a single file.
///
/// Classification is purely lexical: only the final segment's text after its
/// last `.` is consulted, so dotted directory names like `v1.0` stay
/// directories.
pub const SINGLE_FILE_EXTENSIONS: &[&str] = &[
    // docs and plain text
    "md", "markdown", "mdx", "txt", "rst", "adoc", "org", "tex", "csv", "tsv", "log",
    // data and configuration
    "json", "jsonc", "json5", "yaml", "yml", "toml", "ini", "cfg", "conf", "env", "xml",
    "properties", "lock", "gitignore", "gitattributes", "editorconfig", "npmrc", "nvmrc",
    "prettierrc", "eslintrc", "babelrc",
    // markup and styles
    "html", "htm", "css", "scss", "sass", "less", "svg", "vue", "svelte", "astro",
    // scripts and sources
    "js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx", "py", "rb", "rs", "go", "java",
    "kt", "kts", "swift", "c", "h", "cc", "cpp", "hpp", "cs", "php", "lua", "pl", "r",
    "dart", "ex", "exs", "erl", "hs", "ml", "scala", "clj", "zig", "nim", "sql", "graphql",
    "gql", "proto", "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd", "dockerfile",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "zst", "7z", "rar",
];

/// Whether `subpath` names a single file rather than a directory.
pub fn is_single_file(subpath: &str) -> bool {
    let Some(name) = subpath.split('/').rfind(|s| !s.is_empty()) else {
        return false;
    };
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    SINGLE_FILE_EXTENSIONS.contains(&ext.as_str())
}
