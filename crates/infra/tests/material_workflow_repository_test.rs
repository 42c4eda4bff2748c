//! MaterialWorkflowRepository 統合テスト
//!
//! インメモリ実装に対して、集約単位の保存と楽観的ロックを検証する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p matflow-infra --test material_workflow_repository_test
//! ```

use chrono::{DateTime, Duration, Utc};
use matflow_domain::{
    value_objects::{
        ActorId,
        MaterialId,
        MaterialName,
        PlantCode,
        PriorityLevel,
        QueryQuestion,
    },
    workflow::{MaterialWorkflow, NewMaterialWorkflow, NewQuery, QueryId, QueryTeam, WorkflowState},
};
use matflow_infra::{
    InfraErrorKind,
    repository::{InMemoryMaterialWorkflowRepository, MaterialWorkflowRepository},
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn actor(name: &str) -> ActorId {
    ActorId::new(name).unwrap()
}

fn create_workflow(material_id: &str, now: DateTime<Utc>) -> MaterialWorkflow {
    MaterialWorkflow::new(NewMaterialWorkflow {
        material_id: MaterialId::new(material_id).unwrap(),
        material_name: MaterialName::new("テスト素材").unwrap(),
        assigned_plant: PlantCode::new("PLANT-JP01").unwrap(),
        initiated_by: actor("jvc.reviewer"),
        now,
    })
}

#[rstest]
#[tokio::test]
async fn test_insert_で登録したワークフローを取得できる(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let mut workflow = create_workflow("CHEM-001", now);
    workflow
        .raise_query(NewQuery {
            id: QueryId::new(),
            question: QueryQuestion::new("引火点は？").unwrap(),
            step_number: None,
            field_name: None,
            assigned_team: QueryTeam::Cqs,
            priority_level: PriorityLevel::default(),
            raised_by: actor("jvc.reviewer"),
            now,
        })
        .unwrap();

    sut.insert(&workflow).await.unwrap();

    let found = sut.find_by_id(workflow.material_id()).await.unwrap();
    assert_eq!(found, Some(workflow));
}

#[rstest]
#[tokio::test]
async fn test_find_by_id_存在しない場合はnoneを返す() {
    let sut = InMemoryMaterialWorkflowRepository::new();

    let found = sut
        .find_by_id(&MaterialId::new("CHEM-404").unwrap())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[rstest]
#[tokio::test]
async fn test_insert_同じidは競合になる(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    sut.insert(&create_workflow("CHEM-001", now)).await.unwrap();

    let err = sut
        .insert(&create_workflow("CHEM-001", now))
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        InfraErrorKind::Duplicate { material_id } if material_id.as_str() == "CHEM-001"
    ));
}

#[rstest]
#[tokio::test]
async fn test_update_with_version_check_バージョン一致で更新できる(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let mut workflow = create_workflow("CHEM-001", now);
    sut.insert(&workflow).await.unwrap();
    let expected_version = workflow.version();

    workflow
        .transition_to(WorkflowState::PlantPending, actor("jvc.reviewer"), now)
        .unwrap();
    sut.update_with_version_check(&workflow, expected_version)
        .await
        .unwrap();

    let found = sut
        .find_by_id(workflow.material_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.state(), WorkflowState::PlantPending);
    assert_eq!(found.version(), expected_version.next());
}

#[rstest]
#[tokio::test]
async fn test_update_with_version_check_古いバージョンは競合になる(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let original = create_workflow("CHEM-001", now);
    sut.insert(&original).await.unwrap();

    // 先に別の操作者が更新する
    let mut first = original.clone();
    first
        .transition_to(WorkflowState::PlantPending, actor("jvc.reviewer"), now)
        .unwrap();
    sut.update_with_version_check(&first, original.version())
        .await
        .unwrap();

    let mut second = original.clone();
    second
        .transition_to(WorkflowState::PlantPending, actor("jvc.other"), now)
        .unwrap();
    let err = sut
        .update_with_version_check(&second, original.version())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        InfraErrorKind::VersionMismatch { expected, actual, .. }
            if *expected == original.version() && *actual == original.version().next()
    ));
    let stored = sut
        .find_by_id(original.material_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.last_modified_by().as_str(), "jvc.reviewer");
}

#[rstest]
#[tokio::test]
async fn test_update_with_version_check_未登録は競合になる(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let workflow = create_workflow("CHEM-001", now);

    let err = sut
        .update_with_version_check(&workflow, workflow.version())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::NotRegistered { .. }));
}

#[rstest]
#[tokio::test]
async fn test_find_by_state_は状態で絞り込み作成日時順に返す(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let mut later = create_workflow("CHEM-002", now + Duration::hours(2));
    later
        .transition_to(WorkflowState::PlantPending, actor("jvc.reviewer"), now + Duration::hours(3))
        .unwrap();
    let mut earlier = create_workflow("CHEM-003", now + Duration::hours(1));
    earlier
        .transition_to(WorkflowState::PlantPending, actor("jvc.reviewer"), now + Duration::hours(3))
        .unwrap();
    let untouched = create_workflow("CHEM-001", now);
    for w in [&later, &earlier, &untouched] {
        sut.insert(w).await.unwrap();
    }

    let plant: Vec<_> = sut
        .find_by_state(WorkflowState::PlantPending)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.material_id().as_str().to_string())
        .collect();
    let all: Vec<_> = sut
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.material_id().as_str().to_string())
        .collect();

    assert_eq!(plant, vec!["CHEM-003", "CHEM-002"]);
    assert_eq!(all, vec!["CHEM-001", "CHEM-003", "CHEM-002"]);
}

#[rstest]
#[tokio::test]
async fn test_クローンしたリポジトリはストアを共有する(now: DateTime<Utc>) {
    let sut = InMemoryMaterialWorkflowRepository::new();
    let other = sut.clone();

    sut.insert(&create_workflow("CHEM-001", now)).await.unwrap();

    assert_eq!(other.find_all().await.unwrap().len(), 1);
}
