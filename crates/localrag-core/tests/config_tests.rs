use figment::Jail;

use localrag_core::chunker::Boundary;
use localrag_core::config::{Config, ProviderKind, RagConfig, NO_CONTEXT_SENTINEL};
use localrag_core::error::Error;
use localrag_core::similarity::Metric;

#[test]
fn defaults_without_any_files() {
    Jail::expect_with(|_jail| {
        let rag = Config::load().expect("load").rag().expect("rag");
        assert_eq!(rag, RagConfig::default());
        assert_eq!(rag.embedding.provider, ProviderKind::Hash);
        assert_eq!(rag.pipeline.no_context_sentinel, NO_CONTEXT_SENTINEL);
        Ok(())
    });
}

#[test]
fn toml_env_file_and_env_vars_are_layered() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                [embedding]
                dimension = 64
                timeout_ms = 2000

                [retrieval]
                metric = "euclidean"

                [chunking]
                boundary = { separator = "---" }
            "#,
        )?;
        jail.create_file("config.test.toml", "[retrieval]\ndefault_top_k = 9\n")?;
        jail.set_env("RUST_ENV", "test");
        jail.set_env("APP_EMBEDDING__TIMEOUT_MS", "250");

        let config = Config::load().expect("load");
        let rag = config.rag().expect("rag");
        assert_eq!(rag.embedding.dimension, 64);
        assert_eq!(rag.embedding.timeout_ms, 250);
        assert_eq!(rag.retrieval.metric, Metric::Euclidean);
        assert_eq!(rag.retrieval.default_top_k, 9);
        assert_eq!(rag.chunking.boundary, Boundary::Separator("---".to_string()));
        assert_eq!(config.get::<usize>("embedding.dimension").expect("get"), 64);
        Ok(())
    });
}

#[test]
fn invalid_values_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[embedding]\ndimension = 0\n")?;
        assert!(Config::load().is_err());
        Ok(())
    });

    let mut rag = RagConfig::default();
    rag.chunking.overlap_percent = 1.0;
    assert!(matches!(rag.validate(), Err(Error::InvalidConfig(_))));

    let mut rag = RagConfig::default();
    rag.chunking.boundary = Boundary::Separator(String::new());
    assert!(matches!(rag.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn docs_dir_resolves_against_base() {
    let mut rag = RagConfig::default();
    assert!(rag.docs_dir(std::path::Path::new("/base")).is_none());
    rag.data.docs_dir = Some("docs".to_string());
    assert_eq!(rag.docs_dir(std::path::Path::new("/base")).unwrap(), std::path::PathBuf::from("/base/docs"));
    rag.data.docs_dir = Some("/abs/docs".to_string());
    assert_eq!(rag.docs_dir(std::path::Path::new("/base")).unwrap(), std::path::PathBuf::from("/abs/docs"));
}

#[test]
fn config_serializes_in_the_file_shape() -> anyhow::Result<()> {
    let mut rag = RagConfig::default();
    rag.chunking.boundary = Boundary::Separator("---".to_string());
    rag.retrieval.metric = Metric::Euclidean;

    let json = serde_json::to_value(&rag)?;
    assert_eq!(json["chunking"]["boundary"], serde_json::json!({ "separator": "---" }));
    assert_eq!(json["retrieval"]["metric"], "euclidean");
    assert_eq!(json["embedding"]["provider"], "hash");

    let back: RagConfig = serde_json::from_value(json)?;
    assert_eq!(back, rag);
    Ok(())
}
