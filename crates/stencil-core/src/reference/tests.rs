//! Tests for the reference module.

use super::*;

fn canonical(input: &str) -> String {
    normalize(input).canonical
}

mod normalize_tests {
    use super::*;

    #[test]
    fn shorthand_passes_through() {
        let n = normalize("user/repo");
        assert_eq!(n.provider, Some(Provider::GitHub));
        assert_eq!(n.canonical, "user/repo");
    }

    #[test]
    fn shorthand_with_subpath_and_ref() {
        assert_eq!(canonical("user/repo/sub/path#dev"), "user/repo/sub/path#dev");
    }

    #[test]
    fn ref_then_path_is_rewritten() {
        assert_eq!(canonical("user/repo#dev/examples/basic"), "user/repo/examples/basic#dev");
    }

    #[test]
    fn empty_segments_collapse() {
        assert_eq!(canonical("user//repo///examples/"), "user/repo/examples");
    }

    #[test]
    fn git_suffix_is_stripped() {
        assert_eq!(canonical("user/repo.git"), "user/repo");
        assert_eq!(canonical("github:user/repo.git#v2"), "user/repo#v2");
    }

    #[test]
    fn provider_prefix_tags_provider() {
        let n = normalize("codeberg:user/repo/README.md");
        assert_eq!(n.provider, Some(Provider::Codeberg));
        assert_eq!(n.canonical, "user/repo/README.md");

        let n = normalize("github:user/repo");
        assert_eq!(n.provider, Some(Provider::GitHub));
        assert_eq!(n.canonical, "user/repo");
    }

    #[test]
    fn ssh_forms() {
        let n = normalize("git@github.com:user/repo.git");
        assert_eq!(n.provider, Some(Provider::GitHub));
        assert_eq!(n.canonical, "user/repo");

        let n = normalize("git@codeberg.org:user/repo.git#stable");
        assert_eq!(n.provider, Some(Provider::Codeberg));
        assert_eq!(n.canonical, "user/repo#stable");
    }

    #[test]
    fn repository_root_url() {
        assert_eq!(canonical("https://github.com/owner/repo"), "owner/repo");
        assert_eq!(canonical("https://github.com/owner/repo.git"), "owner/repo");
        assert_eq!(canonical("https://www.github.com/owner/repo/"), "owner/repo");
    }

    #[test]
    fn tree_url_becomes_subpath_with_ref() {
        assert_eq!(
            canonical("https://github.com/owner/repo/tree/dev/examples"),
            "owner/repo/examples#dev"
        );
    }

    #[test]
    fn blob_url_keeps_file_path() {
        assert_eq!(
            canonical("https://github.com/owner/repo/blob/main/src/index.ts"),
            "owner/repo/src/index.ts#main"
        );
    }

    #[test]
    fn codeberg_src_branch_url() {
        let n = normalize("https://codeberg.org/user/repo/src/branch/main/templates/basic");
        assert_eq!(n.provider, Some(Provider::Codeberg));
        assert_eq!(n.canonical, "user/repo/templates/basic#main");
    }

    #[test]
    fn codeberg_src_tag_and_commit_urls() {
        assert_eq!(
            canonical("https://codeberg.org/user/repo/src/tag/v1.2.0"),
            "user/repo#v1.2.0"
        );
        assert_eq!(
            canonical("https://codeberg.org/user/repo/src/commit/abc123/docs"),
            "user/repo/docs#abc123"
        );
    }

    #[test]
    fn src_markers_are_plain_paths_on_github() {
        assert_eq!(
            canonical("https://github.com/user/repo/src/branch/main"),
            "user/repo/src/branch/main"
        );
    }

    #[test]
    fn url_fragment_is_explicit_ref() {
        assert_eq!(canonical("https://github.com/user/repo#next"), "user/repo#next");
    }

    #[test]
    fn unknown_hosts_pass_through() {
        let n = normalize("https://gitlab.com/user/repo");
        assert_eq!(n.provider, None);
        assert_eq!(n.canonical, "https://gitlab.com/user/repo");

        let n = normalize("gitlab:user/repo");
        assert_eq!(n.provider, None);
        assert_eq!(n.canonical, "gitlab:user/repo");

        let n = normalize("git@gitlab.com:user/repo.git");
        assert_eq!(n.provider, None);
    }

    #[test]
    fn url_without_repo_passes_through() {
        let n = normalize("https://github.com/owner");
        assert_eq!(n.provider, None);
    }

    #[test]
    fn local_paths_are_never_shorthand() {
        for input in [
            "/srv/git/template",
            "./templates/web",
            "../shared/template#dev",
            "~/templates/web",
            "C:\\templates\\web",
            "D:/templates/web",
        ] {
            let n = normalize(input);
            assert_eq!(n.provider, None, "{input}");
            assert_eq!(n.canonical, input);
        }
    }

    #[test]
    fn url_segments_are_percent_decoded() {
        let n = normalize("https://github.com/user/repo/tree/main/my%20dir");
        assert_eq!(n.provider, Some(Provider::GitHub));
        assert_eq!(n.canonical, "user/repo/my dir#main");

        let spec = TemplateSpec::from_normalized(&n).unwrap();
        assert_eq!(spec.subpath, "my dir");
        assert_eq!(spec.strip_prefix(), "repo-main/my dir/");

        assert_eq!(
            canonical("https://codeberg.org/user/repo/src/tag/release%2D1/docs"),
            "user/repo/docs#release-1"
        );
    }

    #[test]
    fn canonical_forms_are_idempotent() {
        for input in [
            "owner/repo",
            "owner/repo#ref",
            "owner/repo/sub/path",
            "owner/repo/sub/path#ref",
        ] {
            let once = canonical(input);
            assert_eq!(once, input);
            assert_eq!(canonical(&once), once);
        }
    }
}

mod parse_tests {
    use super::*;

    #[test]
    fn default_ref_is_main() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo").unwrap();
        assert_eq!(spec.owner, "user");
        assert_eq!(spec.repo, "repo");
        assert_eq!(spec.git_ref, DEFAULT_REF);
        assert_eq!(spec.subpath, "");
    }

    #[test]
    fn subpath_and_explicit_ref() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo/a/b#v1").unwrap();
        assert_eq!(spec.git_ref, "v1");
        assert_eq!(spec.subpath, "a/b");
    }

    #[test]
    fn too_few_segments_is_invalid() {
        for input in ["", "user", "user/", "/repo", "user/.git"] {
            let err = TemplateSpec::parse(Provider::GitHub, input).unwrap_err();
            assert!(
                matches!(err, crate::error::FetchError::InvalidReference(_)),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn codeberg_branch_layout_sets_ref() {
        let spec =
            TemplateSpec::parse(Provider::Codeberg, "user/repo/src/branch/dev/templates/web")
                .unwrap();
        assert_eq!(spec.git_ref, "dev");
        assert_eq!(spec.subpath, "templates/web");
    }

    #[test]
    fn explicit_ref_overrides_path_ref() {
        let spec =
            TemplateSpec::parse(Provider::Codeberg, "user/repo/src/branch/dev/docs#stable")
                .unwrap();
        assert_eq!(spec.git_ref, "stable");
        assert_eq!(spec.subpath, "docs");
    }

    #[test]
    fn incomplete_marker_is_plain_subpath() {
        let spec = TemplateSpec::parse(Provider::Codeberg, "user/repo/src/branch").unwrap();
        assert_eq!(spec.git_ref, DEFAULT_REF);
        assert_eq!(spec.subpath, "src/branch");
    }

    #[test]
    fn github_ignores_codeberg_markers() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo/src/branch/dev").unwrap();
        assert_eq!(spec.git_ref, DEFAULT_REF);
        assert_eq!(spec.subpath, "src/branch/dev");
    }

    #[test]
    fn codeberg_readme_reference() {
        let normalized = normalize("codeberg:user/repo/README.md");
        let spec = TemplateSpec::from_normalized(&normalized).unwrap();
        assert_eq!(
            spec,
            TemplateSpec {
                provider: Provider::Codeberg,
                owner: "user".to_string(),
                repo: "repo".to_string(),
                git_ref: "main".to_string(),
                subpath: "README.md".to_string(),
            }
        );
        assert!(spec.is_single_file());
        assert_eq!(
            spec.raw_url(),
            "https://codeberg.org/user/repo/raw/main/README.md"
        );
    }

    #[test]
    fn unrecognised_reference_does_not_parse() {
        let normalized = normalize("gitlab:user/repo");
        assert!(TemplateSpec::from_normalized(&normalized).is_err());
    }

    #[test]
    fn canonical_round_trips_through_parse() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo/examples#dev").unwrap();
        assert_eq!(spec.canonical(), "user/repo/examples#dev");
        let again = TemplateSpec::parse(Provider::GitHub, &spec.canonical()).unwrap();
        assert_eq!(again, spec);
    }

    #[test]
    fn spec_serializes_ref_field() {
        let spec = TemplateSpec::parse(Provider::Codeberg, "user/repo#dev").unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["provider"], "codeberg");
        assert_eq!(json["ref"], "dev");
    }

    #[test]
    fn archive_details_follow_provider() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo/examples").unwrap();
        assert_eq!(
            spec.archive_url(),
            "https://codeload.github.com/user/repo/tar.gz/main"
        );
        assert_eq!(spec.strip_prefix(), "repo-main/examples/");
    }

    #[test]
    fn retrieval_target_classifies_once() {
        let spec = TemplateSpec::parse(Provider::GitHub, "user/repo/v1.0").unwrap();
        let target = RetrievalTarget::new(spec, "/tmp/out");
        assert!(!target.is_single_file);
        assert_eq!(target.destination, std::path::PathBuf::from("/tmp/out"));
    }
}
