use assignment_annotator::models::load_assignment_config;
use assignment_annotator::models::marker::MarkerCategory;
use assignment_annotator::services::allocation::AllocationMode;
use assignment_annotator::services::highlight_renderer::remove_all_highlights;
use assignment_annotator::utils::logging;
use assignment_annotator::{
    AllocationRequest, AnnotationSession, App, AssignmentConfig, Config, ImportedDocument,
    MarkerAction, MarkerError, MatchStrictness,
};
use std::fs;

const WORKSHEET_HTML: &str = "<h1>Chapter 4 Section 1 Worksheet</h1>\
<p>Name: ________</p>\
<p>Part A: Vocabulary. Define photosynthesis.</p>\
<p>Part B: Short answer. Explain why leaves are green.</p>";

fn worksheet() -> ImportedDocument {
    ImportedDocument::new(
        "Chapter 4 Section 1 Worksheet Name: Part A: Vocabulary. Define photosynthesis. Part B: Short answer. Explain why leaves are green.",
        WORKSHEET_HTML,
        "ch4_sec1_worksheet.docx",
    )
}

#[test]
fn test_annotate_worksheet_end_to_end() {
    let mut config = AssignmentConfig::new("Chapter 4 Section 1 Worksheet");
    config.effort_points = 10;

    let session = AnnotationSession::new(config, &worksheet())
        .dispatch(MarkerAction::AddStart("Part A:".to_string()))
        .and_then(|s| s.dispatch(MarkerAction::AddEnd("Define photosynthesis.".to_string())))
        .and_then(|s| s.dispatch(MarkerAction::AddStart("Part B:".to_string())))
        .and_then(|s| s.dispatch(MarkerAction::AddExclude("Name: ________".to_string())))
        .and_then(|s| s.dispatch(MarkerAction::SetPoints { index: 0, points: 40 }))
        .and_then(|s| s.dispatch(MarkerAction::SetPoints { index: 1, points: 50 }))
        .and_then(|s| {
            s.dispatch(MarkerAction::SetCategory {
                index: 0,
                category: MarkerCategory::Vocabulary,
            })
        })
        .expect("标注流程应该全部成功");

    let html = session.html();
    assert!(html.contains(r#"data-marker-id="start-0""#));
    assert!(html.contains(r#"data-marker-id="end-0""#));
    assert!(html.contains(r#"data-marker-id="start-1""#));
    assert!(html.contains(r#"data-marker-id="exclude-0""#));
    assert_eq!(remove_all_highlights(html), WORKSHEET_HTML);

    let config = session.config();
    assert!(config.point_summary().is_balanced());
    let sections = config.grading_sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].category, MarkerCategory::Vocabulary);
    assert_eq!(sections[0].end.as_deref(), Some("Define photosynthesis."));
    assert_eq!(config.excluded_texts(), vec!["Name: ________"]);

    // 删除第一个分段后，剩下的高亮仍然保留原来的 ID
    let session = session.dispatch(MarkerAction::Remove(0)).unwrap();
    assert!(!session.html().contains("start-0"));
    assert!(session.html().contains(r#"data-marker-id="start-1""#));

    // 新加的分段不会和已有 ID 冲突
    let session = session
        .dispatch(MarkerAction::AddStart("Chapter 4".to_string()))
        .unwrap();
    assert!(session.html().contains(r#"data-marker-id="start-2""#));
}

#[test]
fn test_annotation_rejections_are_reported() {
    let session = AnnotationSession::new(AssignmentConfig::new("Worksheet"), &worksheet());

    assert!(matches!(
        session.dispatch(MarkerAction::AddStart("ab".to_string())),
        Err(MarkerError::SelectionTooShort { .. })
    ));
    assert_eq!(
        session.dispatch(MarkerAction::AddEnd("Define photosynthesis.".to_string())),
        Err(MarkerError::NoOpenStartMarker)
    );
    assert!(matches!(
        session.dispatch(MarkerAction::Remove(3)),
        Err(MarkerError::IndexOutOfRange { .. })
    ));
}

#[tokio::test]
async fn test_legacy_config_is_migrated_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reading_log.json");
    fs::write(
        &path,
        r#"{
            "title": "Reading Log",
            "effortPoints": 15,
            "markers": ["Summary:", {"start": "Vocabulary:", "end": "Done."}]
        }"#,
    )
    .unwrap();

    let config = load_assignment_config(&path).await.unwrap();
    assert_eq!(config.markers[0].points, 43);
    assert_eq!(config.markers[1].points, 42);
    assert_eq!(config.markers[1].end.as_deref(), Some("Done."));
    assert!(config.point_summary().is_balanced());

    // 迁移后的配置再保存、再加载，分值不再变化
    let saved = dir.path().join("reading_log_saved.json");
    fs::write(&saved, serde_json::to_string(&config).unwrap()).unwrap();
    let reloaded = load_assignment_config(&saved).await.unwrap();
    assert_eq!(reloaded.markers, config.markers);
}

#[tokio::test]
async fn test_watch_cycle_routes_submissions() {
    logging::init(false);

    let dir = tempfile::tempdir().unwrap();
    let assignments = dir.path().join("assignments");
    let submissions = dir.path().join("submissions");
    fs::create_dir_all(&assignments).unwrap();
    fs::create_dir_all(&submissions).unwrap();

    fs::write(
        assignments.join("worksheet.toml"),
        r#"
title = "Chapter 4 Section 1 Worksheet"
effortPoints = 10
aliases = ["Photosynthesis Worksheet"]

[[markers]]
start = "Part A:"
points = 45

[[markers]]
start = "Part B:"
points = 45
"#,
    )
    .unwrap();
    fs::write(assignments.join("broken.json"), "{ not json").unwrap();

    for name in [
        "Smith, John - ch4 sec1.pdf",
        "Doe_Jane_Photosynthesis_Worksheet.docx",
        "John Smith lunch menu.pdf",
        ".DS_Store",
    ] {
        fs::write(submissions.join(name), b"").unwrap();
    }

    let log_file = dir.path().join("output.txt");
    let config = Config {
        assignments_folder: assignments.to_string_lossy().to_string(),
        submissions_folder: submissions.to_string_lossy().to_string(),
        output_log_file: log_file.to_string_lossy().to_string(),
        total_questions: 20,
        total_points: 100,
        allocation_mode: AllocationMode::Exact,
        ..Config::default()
    };

    let outcome = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.report.considered, 3);
    assert_eq!(
        outcome.report.routed["Chapter 4 Section 1 Worksheet"],
        vec![
            "Doe_Jane_Photosynthesis_Worksheet.docx".to_string(),
            "Smith, John - ch4 sec1.pdf".to_string(),
        ]
    );
    assert_eq!(
        outcome.report.unmatched,
        vec!["John Smith lunch menu.pdf".to_string()]
    );
    assert!(outcome.allocation.is_exact());

    let log = fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("作业标注日志"));
    assert!(log.contains("Smith, John - ch4 sec1.pdf"));
}

#[tokio::test]
async fn test_watch_cycle_with_student_filter() {
    let dir = tempfile::tempdir().unwrap();
    let assignments = dir.path().join("assignments");
    let submissions = dir.path().join("submissions");
    fs::create_dir_all(&assignments).unwrap();
    fs::create_dir_all(&submissions).unwrap();

    fs::write(
        assignments.join("essay.json"),
        r#"{"title": "Persuasive Essay"}"#,
    )
    .unwrap();
    for name in ["Jane Doe Persuasive Essay.docx", "John Smith Persuasive Essay.docx"] {
        fs::write(submissions.join(name), b"").unwrap();
    }

    let config = Config {
        assignments_folder: assignments.to_string_lossy().to_string(),
        submissions_folder: submissions.to_string_lossy().to_string(),
        output_log_file: dir.path().join("output.txt").to_string_lossy().to_string(),
        student_filter: Some("Doe; Jane Marie".to_string()),
        match_strictness: MatchStrictness::Strict,
        ..Config::default()
    };

    let outcome = App::initialize(config).await.unwrap().run().await.unwrap();
    assert_eq!(outcome.report.filtered_out, 1);
    assert_eq!(
        outcome.report.routed["Persuasive Essay"],
        vec!["Jane Doe Persuasive Essay.docx".to_string()]
    );
}

#[test]
fn test_allocation_modes_for_default_assessment() {
    let legacy = AllocationRequest::new(20, 100).allocate();
    let exact = AllocationRequest::new(20, 100)
        .with_mode(AllocationMode::Exact)
        .allocate();

    assert_eq!(legacy.question_type_counts, exact.question_type_counts);
    assert_eq!(legacy.question_type_counts.values().sum::<u32>(), 20);
    assert_eq!(legacy.dok_distribution.values().sum::<u32>(), 20);
    assert!(legacy.achieved_points <= 100);
    assert_eq!(exact.achieved_points, 100);
}
