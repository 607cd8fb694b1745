mod common;

use std::sync::Arc;

use common::{pipeline, BrokenEmbedder, CountingEmbedder, RecordingModel, Reply};
use complaint_resolver::categories::Category;
use complaint_resolver::corpus::SEED_CORPUS;
use complaint_resolver::config::{Config, EmbeddingConfig};
use complaint_resolver::embedding::{provider_or_unavailable, HashProvider};
use complaint_resolver::error::{ResolutionError, MISSING_CREDENTIAL_MARKER};
use complaint_resolver::knowledge::ResetOutcome;
use complaint_resolver::pipeline::{ResolutionPath, ResolutionPipeline};
use complaint_resolver::prompt::{contains_placeholder, NO_CONTEXT};

const DEALERSHIP: &str =
    "A car dealership pulled my credit report yesterday, but I never visited them";

#[tokio::test]
async fn test_end_to_end_dealership_complaint() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fixed(
        "The bank is required to investigate the inquiry.".to_string(),
    )));
    let p = pipeline(
        tmp.path(),
        Arc::new(HashProvider::default()),
        model.clone(),
        Some("gsk_test"),
    );

    let category = Category::from_label("LABEL_1").name();
    assert_eq!(category, "Reporting company used your report improperly");

    let resolution = p.resolve(DEALERSHIP, category).await.unwrap();

    assert_eq!(resolution.path, ResolutionPath::Augmented);
    assert_eq!(resolution.retrieved.len(), 3);
    assert_eq!(
        resolution.retrieved[0].document.metadata.issue,
        "Reporting company used your report improperly (LABEL_1)"
    );

    let sent = model.last_prompt();
    assert!(sent
        .system_instruction
        .contains("Reporting company used your report improperly"));
    assert!(sent.context.contains("permissible purpose"));
    assert!(sent.system_instruction.contains("permissible purpose"));
    assert_eq!(sent.user_message, DEALERSHIP);

    assert_eq!(
        p.generate_resolution(DEALERSHIP, category).await,
        "The bank is required to investigate the inquiry."
    );
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_build_happens_once_across_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let embedder = Arc::new(CountingEmbedder::new());
    let model = Arc::new(RecordingModel::new(Reply::Fixed("ok".into())));
    let p = pipeline(tmp.path(), embedder.clone(), model, Some("k"));

    for _ in 0..3 {
        assert_eq!(p.generate_resolution(DEALERSHIP, "Other").await, "ok");
    }
    assert_eq!(embedder.corpus_embeds(), 1);
    assert_eq!(p.knowledge().build_count(), 1);
}

#[tokio::test]
async fn test_reset_triggers_rebuild() {
    let tmp = tempfile::tempdir().unwrap();
    let embedder = Arc::new(CountingEmbedder::new());
    let model = Arc::new(RecordingModel::new(Reply::Fixed("ok".into())));
    let p = pipeline(tmp.path(), embedder.clone(), model, Some("k"));

    p.generate_resolution(DEALERSHIP, "Other").await;
    assert_eq!(p.reset_knowledge().await.unwrap(), ResetOutcome::CacheOnly);
    p.generate_resolution(DEALERSHIP, "Other").await;

    assert_eq!(embedder.corpus_embeds(), 2);
    assert_eq!(p.knowledge().build_count(), 2);
}

#[tokio::test]
async fn test_reset_picks_up_new_persistent_index() {
    let tmp = tempfile::tempdir().unwrap();
    let embedder = Arc::new(CountingEmbedder::new());
    let model = Arc::new(RecordingModel::new(Reply::Fixed("ok".into())));
    let p = pipeline(tmp.path(), embedder.clone(), model, Some("k"));

    let before = p.search(DEALERSHIP).await.unwrap();
    assert_eq!(embedder.corpus_embeds(), 1);

    // Index written after the first build is not seen until a reset.
    p.knowledge().persist_seed().await.unwrap();
    assert_eq!(embedder.corpus_embeds(), 2);
    p.search(DEALERSHIP).await.unwrap();
    assert_eq!(p.knowledge().build_count(), 1);

    p.knowledge().reset().await.unwrap();
    p.knowledge().persist_seed().await.unwrap();
    let after = p.search(DEALERSHIP).await.unwrap();

    // Loaded from disk: no further corpus embedding.
    assert_eq!(embedder.corpus_embeds(), 3);
    assert_eq!(p.knowledge().build_count(), 2);
    assert_eq!(
        before[0].document.metadata.issue,
        after[0].document.metadata.issue
    );
}

#[tokio::test]
async fn test_degraded_path_when_build_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fixed(
        "General guidance without precedent.".into(),
    )));
    let p = pipeline(tmp.path(), Arc::new(BrokenEmbedder), model.clone(), Some("k"));

    let resolution = p.resolve(DEALERSHIP, "Other").await.unwrap();
    assert_eq!(resolution.path, ResolutionPath::Degraded);
    assert!(resolution.retrieved.is_empty());
    assert_eq!(resolution.prompt.context, NO_CONTEXT);
    assert!(model
        .last_prompt()
        .system_instruction
        .ends_with("Context from database:\nNo historical context available."));

    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(!text.is_empty());
    assert_eq!(text, "General guidance without precedent.");

    // The failed build is not retried per request.
    assert_eq!(p.knowledge().build_count(), 1);

    // Search reports the outage instead of hiding it.
    assert!(matches!(
        p.search("anything").await,
        Err(ResolutionError::RetrievalUnavailable(_))
    ));
}

#[tokio::test]
async fn test_misconfigured_embedder_degrades_instead_of_failing() {
    let tmp = tempfile::tempdir().unwrap();
    let embedding = EmbeddingConfig {
        provider: "word2vec".to_string(),
        ..EmbeddingConfig::default()
    };
    let model = Arc::new(RecordingModel::new(Reply::Fixed("Plan without precedent.".into())));
    let p = pipeline(
        tmp.path(),
        provider_or_unavailable(&embedding),
        model.clone(),
        Some("k"),
    );

    let resolution = p.resolve(DEALERSHIP, "Other").await.unwrap();
    assert_eq!(resolution.path, ResolutionPath::Degraded);
    assert_eq!(resolution.prompt.context, NO_CONTEXT);
    assert_eq!(
        p.generate_resolution(DEALERSHIP, "Other").await,
        "Plan without precedent."
    );
    assert!(matches!(
        p.search(DEALERSHIP).await,
        Err(ResolutionError::RetrievalUnavailable(reason)) if reason.contains("word2vec")
    ));
}

#[tokio::test]
async fn test_from_config_survives_embedder_setup_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.store.persist_dir = tmp.path().join("index");
    cfg.embedding.provider = "word2vec".to_string();
    cfg.generation.endpoint = "http://127.0.0.1:9/v1".to_string();
    cfg.generation.timeout_secs = Some(5);
    cfg.credentials.key_name = "COMPLAINT_RESOLVER_PIPELINE_TEST_KEY".to_string();
    cfg.credentials.secrets_file = tmp.path().join("secrets.toml");
    cfg.credentials.key_file = tmp.path().join("key.txt");

    let p = ResolutionPipeline::from_config(&cfg);

    // Without a key the usual message comes back.
    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(text.contains(MISSING_CREDENTIAL_MARKER));

    // With a key the request reaches generation on the degraded path.
    std::fs::write(tmp.path().join("key.txt"), "gsk_test\n").unwrap();
    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(text.starts_with("An error occurred while generating the response"));
    assert_eq!(p.knowledge().build_count(), 1);
}

#[tokio::test]
async fn test_missing_credential_short_circuits() {
    let tmp = tempfile::tempdir().unwrap();
    let embedder = Arc::new(CountingEmbedder::new());
    let model = Arc::new(RecordingModel::new(Reply::Fixed("unused".into())));
    let p = pipeline(tmp.path(), embedder.clone(), model.clone(), None);

    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(text.contains(MISSING_CREDENTIAL_MARKER));
    assert_eq!(model.calls(), 0);
    // No retrieval or build work either.
    assert_eq!(embedder.corpus_embeds(), 0);
    assert_eq!(p.knowledge().build_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_becomes_message() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fail(ResolutionError::Generation(
        "HTTP 429 Too Many Requests".into(),
    ))));
    let p = pipeline(tmp.path(), Arc::new(HashProvider::default()), model.clone(), Some("k"));

    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(text.starts_with("An error occurred while generating the response"));
    assert!(text.contains("429"));
    // Single attempt.
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_model_init_failure_becomes_message() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fail(ResolutionError::ModelInit(
        "unknown model".into(),
    ))));
    let p = pipeline(tmp.path(), Arc::new(HashProvider::default()), model, Some("k"));

    let text = p.generate_resolution(DEALERSHIP, "Other").await;
    assert!(text.starts_with("Error initializing AI model"));
}

#[tokio::test]
async fn test_seed_content_query_ranks_its_document_first() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fixed("ok".into())));
    let p = pipeline(tmp.path(), Arc::new(HashProvider::default()), model, Some("k"));

    for (issue, content) in SEED_CORPUS {
        let hits = p.search(content).await.unwrap();
        assert_eq!(hits[0].rank, 0);
        assert_eq!(hits[0].document.metadata.issue, issue);
    }
}

#[tokio::test]
async fn test_plan_has_no_placeholders() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::FollowInstruction));
    let p = pipeline(tmp.path(), Arc::new(HashProvider::default()), model, Some("k"));

    for (_, category) in Category::all() {
        let text = p.generate_resolution(DEALERSHIP, category.name()).await;
        assert!(text.contains(category.name()));
        assert!(text.contains("1. Acknowledge the issue with empathy."));
        assert!(!contains_placeholder(&text), "placeholder in: {}", text);
    }
}

#[tokio::test]
async fn test_prompt_differs_per_category() {
    let tmp = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::new(Reply::Fixed("ok".into())));
    let p = pipeline(tmp.path(), Arc::new(HashProvider::default()), model, Some("k"));

    let a = p.resolve(DEALERSHIP, "Debt is not yours").await.unwrap();
    let b = p.resolve(DEALERSHIP, "Account status incorrect").await.unwrap();
    assert_eq!(a.prompt.context, b.prompt.context);
    assert_ne!(a.prompt.system_instruction, b.prompt.system_instruction);
}
