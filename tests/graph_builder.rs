//! Property and scenario coverage for positional insertion into the default
//! transition chain.

use approvalflow_core::definition::DefinitionGraphBuilder;
use approvalflow_core::models::{
    NewActivityDefinition, NewWorkflowDefinition, WorkflowDefinition, BACK_TRANSITION_NAME,
    DEFAULT_TRANSITION_NAME,
};
use approvalflow_core::store::{MemoryWorkflowStore, WorkflowStore};
use proptest::prelude::*;
use std::sync::Arc;

async fn fresh_definition(
    store: &Arc<MemoryWorkflowStore>,
) -> (DefinitionGraphBuilder, WorkflowDefinition) {
    let definition = store
        .create_definition(NewWorkflowDefinition::new("chain under test"))
        .await
        .unwrap();
    (DefinitionGraphBuilder::new(store.clone()), definition)
}

#[tokio::test]
async fn test_chain_is_walkable_in_both_directions() {
    let store = Arc::new(MemoryWorkflowStore::new());
    let (builder, mut definition) = fresh_definition(&store).await;

    let mut ids = Vec::new();
    for position in 1..=5 {
        let definition_id = definition.id;
        let created = builder
            .insert_activity(
                &mut definition,
                NewActivityDefinition::single(definition_id, format!("step {position}")),
                position,
            )
            .await
            .unwrap();
        ids.push(created.id);
    }

    // Forward walk from the start pointer
    let mut walked = vec![definition.start_activity_definition_id.unwrap()];
    while store
        .has_next_activity(*walked.last().unwrap(), DEFAULT_TRANSITION_NAME)
        .await
        .unwrap()
    {
        let next = store
            .find_next_activity_definition(*walked.last().unwrap(), DEFAULT_TRANSITION_NAME)
            .await
            .unwrap();
        walked.push(next.id);
    }
    assert_eq!(walked, ids);

    // Every non-head activity has a back edge to its predecessor
    for window in ids.windows(2) {
        let back = store
            .find_next_activity_definition(window[1], BACK_TRANSITION_NAME)
            .await
            .unwrap();
        assert_eq!(back.id, window[0]);
    }
}

#[tokio::test]
async fn test_positions_stay_contiguous_after_splices() {
    let store = Arc::new(MemoryWorkflowStore::new());
    let (builder, mut definition) = fresh_definition(&store).await;

    for position in [1, 2, 1, 2, 3] {
        let definition_id = definition.id;
        builder
            .insert_activity(
                &mut definition,
                NewActivityDefinition::single(definition_id, "step"),
                position,
            )
            .await
            .unwrap();
    }

    let chain = store
        .find_all_default_activity_definitions(&definition)
        .await
        .unwrap();
    let positions: Vec<i32> = chain.iter().map(|a| a.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Inserting at any sequence of valid positions yields the same order as
    /// inserting into a plain vector, with contiguous 1-based positions.
    #[test]
    fn prop_chain_order_matches_vector_model(seed_positions in prop::collection::vec(0usize..8, 1..8)) {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryWorkflowStore::new());
            let (builder, mut definition) = fresh_definition(&store).await;

            let mut model: Vec<i64> = Vec::new();
            for seed in seed_positions {
                // Clamp the seed into the valid insertion range 1..=len+1
                let position = (seed % (model.len() + 1)) + 1;
                let definition_id = definition.id;
                let created = builder
                    .insert_activity(
                        &mut definition,
                        NewActivityDefinition::single(definition_id, "step"),
                        position as i32,
                    )
                    .await
                    .unwrap();
                model.insert(position - 1, created.id);
            }

            let chain = store
                .find_all_default_activity_definitions(&definition)
                .await
                .unwrap();
            let chain_ids: Vec<i64> = chain.iter().map(|a| a.id).collect();
            assert_eq!(chain_ids, model);

            let positions: Vec<i32> = chain.iter().map(|a| a.position).collect();
            let expected: Vec<i32> = (1..=chain.len() as i32).collect();
            assert_eq!(positions, expected);

            assert_eq!(
                definition.start_activity_definition_id,
                chain.first().map(|a| a.id)
            );
        });
    }
}
