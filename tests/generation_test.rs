//! End-to-end generation through the public API: configuration file in, artifacts and marker
//! out.

mod common;

use common::{create_vocab_dir, read_artifact, write_config, FixedTransport, PERSON_VOCAB};
use filetime::{set_file_mtime, FileTime};
use std::sync::Arc;
use test_log::test;
use vocabgen_core::{
    artifact::JsonRenderer,
    config::{ConfigProvider, GeneratorConfig, StaticConfigProvider, YamlConfigProvider},
    orchestrator::{ArtifactOrchestrator, GenerationOutcome},
    resource::{LocalCopyStore, ReqwestTransport},
    VocabError,
};

fn yaml_orchestrator(config_path: std::path::PathBuf) -> ArtifactOrchestrator {
    let provider: Arc<dyn ConfigProvider> = Arc::new(YamlConfigProvider::new(config_path));
    ArtifactOrchestrator::with_provider(
        provider,
        Arc::new(ReqwestTransport::new(None).unwrap()),
        Arc::new(JsonRenderer),
    )
    .unwrap()
}

#[test(tokio::test)]
async fn selection_resource_scopes_terms_and_adds_labels() {
    let temp_dir = tempfile::tempdir().unwrap();
    create_vocab_dir(&temp_dir);
    let config_path = write_config(
        &temp_dir,
        "  - inputResources:\n      - ./vocab/person.ttl\n    termSelectionResource: ./vocab/person-ext.ttl\n",
    );
    let mut orchestrator = yaml_orchestrator(config_path);

    let GenerationOutcome::Generated(report) = orchestrator.generate().await.unwrap() else {
        panic!("first run must generate");
    };
    assert_eq!(report.vocabularies.len(), 1);
    assert_eq!(report.vocabularies[0].prefix, "ex");
    assert_eq!(report.vocabularies[0].classes, 1);
    assert_eq!(report.vocabularies[0].properties, 0);

    let artifact = temp_dir.path().join("out").join("Json").join("ex.json");
    assert_eq!(report.artifacts, vec![artifact.clone()]);
    let json = read_artifact(&artifact);
    let person = &json["vocabulary"]["classes"][0];
    assert_eq!(person["localName"], "Person");
    assert_eq!(
        person["labels"],
        serde_json::json!([
            {"value": "Persona", "language": "es"},
            {"value": "Person", "language": "en"},
        ])
    );
    assert_eq!(person["canonicalComment"], "A human being");
    assert_eq!(json["vocabulary"]["description"], "People and their names");
}

#[test(tokio::test)]
async fn unchanged_inputs_skip_and_touched_selection_regenerates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vocab_dir = create_vocab_dir(&temp_dir);
    let config_path = write_config(
        &temp_dir,
        "  - inputResources:\n      - ./vocab/person.ttl\n    termSelectionResource: ./vocab/person-ext.ttl\n",
    );
    let old = FileTime::from_unix_time(1_000_000, 0);
    set_file_mtime(vocab_dir.join("person.ttl"), old).unwrap();
    set_file_mtime(vocab_dir.join("person-ext.ttl"), old).unwrap();

    let mut orchestrator = yaml_orchestrator(config_path);
    assert!(matches!(
        orchestrator.generate().await.unwrap(),
        GenerationOutcome::Generated(_)
    ));
    assert_eq!(
        orchestrator.generate().await.unwrap(),
        GenerationOutcome::Skipped
    );

    std::fs::write(
        vocab_dir.join("person-ext.ttl"),
        "@prefix ex: <http://ex.org/> .\n@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\nex:name rdfs:label \"nombre\"@es .\n",
    )
    .unwrap();
    set_file_mtime(
        vocab_dir.join("person-ext.ttl"),
        FileTime::from_system_time(std::time::SystemTime::now() + std::time::Duration::from_secs(60)),
    )
    .unwrap();

    let GenerationOutcome::Generated(report) = orchestrator.generate().await.unwrap() else {
        panic!("a newer selection resource must regenerate");
    };
    assert_eq!(report.vocabularies[0].classes, 0);
    assert_eq!(report.vocabularies[0].properties, 1);
}

#[test(tokio::test)]
async fn non_vocabulary_terms_fail_unless_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vocab_dir = create_vocab_dir(&temp_dir);
    std::fs::write(
        vocab_dir.join("mixed.ttl"),
        format!(
            "{PERSON_VOCAB}\n<http://other.org/Thing> a <http://www.w3.org/2000/01/rdf-schema#Class> .\n"
        ),
    )
    .unwrap();
    let mixed = vocab_dir.join("mixed.ttl").to_string_lossy().to_string();

    let mut config =
        GeneratorConfig::for_resources(vec![mixed], None, temp_dir.path().join("out"));
    config.vocab_list[0].namespace_iri_override = Some("http://ex.org/".to_string());
    let transport = Arc::new(FixedTransport::default());

    let mut strict =
        ArtifactOrchestrator::new(config.clone(), transport.clone(), Arc::new(JsonRenderer))
            .unwrap();
    assert!(matches!(
        strict.generate().await,
        Err(VocabError::NamespaceMismatch { .. })
    ));

    config.vocab_list[0].ignore_non_vocab_terms = true;
    let mut lenient = ArtifactOrchestrator::with_provider(
        Arc::new(StaticConfigProvider(config)),
        transport,
        Arc::new(JsonRenderer),
    )
    .unwrap();
    let GenerationOutcome::Generated(report) = lenient.generate().await.unwrap() else {
        panic!("lenient run must generate");
    };
    assert_eq!(report.vocabularies[0].classes, 1);
}

#[test(tokio::test)]
async fn offline_vocabulary_is_served_from_local_copy() {
    const URL: &str = "http://ex.org/";
    let temp_dir = tempfile::tempdir().unwrap();
    let copies = temp_dir.path().join("copies");
    let mut config =
        GeneratorConfig::for_resources(vec![URL.to_string()], None, temp_dir.path().join("out"));
    config.local_copy_directory = Some(copies.clone());
    config.force = true;

    let transport = Arc::new(FixedTransport::default());
    transport.serve(URL, PERSON_VOCAB, "text/turtle; charset=utf-8");
    let mut orchestrator =
        ArtifactOrchestrator::new(config, transport.clone(), Arc::new(JsonRenderer)).unwrap();

    let GenerationOutcome::Generated(first) = orchestrator.generate().await.unwrap() else {
        panic!("forced run must generate");
    };
    assert_eq!(first.local_copies.len(), 1);
    assert!(first.local_copies[0].starts_with(&copies));
    assert_eq!(
        LocalCopyStore::new(&copies).latest(URL).await.unwrap(),
        Some(first.local_copies[0].clone())
    );

    transport.take_offline(URL);
    assert!(orchestrator.invalidate(URL));
    let GenerationOutcome::Generated(second) = orchestrator.generate().await.unwrap() else {
        panic!("offline run must still generate");
    };
    assert_eq!(second.vocabularies, first.vocabularies);
    assert!(second.local_copies.is_empty());
    assert!(orchestrator.cache().entry(URL).unwrap().from_local_copy);
    assert_eq!(transport.hits(), vec![URL.to_string(), URL.to_string()]);
}

#[test(tokio::test)]
async fn offline_vocabulary_without_copy_reports_both_failures() {
    const URL: &str = "http://ex.org/";
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config =
        GeneratorConfig::for_resources(vec![URL.to_string()], None, temp_dir.path().join("out"));
    config.local_copy_directory = Some(temp_dir.path().join("copies"));

    let mut orchestrator = ArtifactOrchestrator::new(
        config,
        Arc::new(FixedTransport::default()),
        Arc::new(JsonRenderer),
    )
    .unwrap();
    match orchestrator.generate().await {
        Err(VocabError::CacheLookup { source, .. }) => {
            assert!(matches!(*source, VocabError::Fetch { .. }));
        }
        other => panic!("expected a cache lookup failure, got {other:?}"),
    }
    assert!(!temp_dir.path().join("out").exists());
}
