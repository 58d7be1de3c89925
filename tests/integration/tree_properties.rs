//! Property tests over randomly grown trees

use proptest::prelude::*;
use std::collections::HashSet;
use webpad::tree::path::{canonical_path, find_by_relative_path, join, relative_path};
use webpad::tree::Project;
use webpad::types::NodeId;

/// Grow a tree from (is_folder, parent selector) steps; folders are the only parents
fn grow(steps: &[(bool, usize)]) -> (Project, Vec<NodeId>) {
    let mut project = Project::new("prop");
    let mut folders = vec![project.root_id.clone()];
    for (n, (is_folder, pick)) in steps.iter().enumerate() {
        let parent = folders[pick % folders.len()].clone();
        let name = format!("n{}", n);
        if *is_folder {
            let id = project.create_folder(&parent, &name).unwrap();
            folders.push(id);
        } else {
            project.create_file(&parent, &format!("{}.js", name)).unwrap();
        }
    }
    (project, folders)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn deleting_removes_exactly_the_reachable_set(
        steps in prop::collection::vec((any::<bool>(), any::<usize>()), 1..40),
        victim in any::<usize>(),
    ) {
        let (mut project, folders) = grow(&steps);
        let candidates: Vec<NodeId> = project
            .nodes
            .keys()
            .filter(|id| **id != project.root_id)
            .cloned()
            .collect();
        prop_assume!(!candidates.is_empty());
        let target = candidates[victim % candidates.len()].clone();
        let parent = project.get(&target).unwrap().parent_id.clone().unwrap();

        let reachable: HashSet<NodeId> = project.subtree_ids(&target).into_iter().collect();
        let before: HashSet<NodeId> = project.nodes.keys().cloned().collect();

        let removed: HashSet<NodeId> = project.delete_node(&target).unwrap().into_iter().collect();
        let after: HashSet<NodeId> = project.nodes.keys().cloned().collect();

        prop_assert_eq!(&removed, &reachable);
        prop_assert_eq!(before.difference(&after).cloned().collect::<HashSet<_>>(), reachable);
        prop_assert!(!project.get(&parent).unwrap().children_ids().contains(&target));
        prop_assert!(project.validate().is_ok());
        prop_assert!(folders.contains(&parent));
    }

    #[test]
    fn every_node_path_round_trips(
        steps in prop::collection::vec((any::<bool>(), any::<usize>()), 1..40),
    ) {
        let (project, _) = grow(&steps);
        prop_assert_eq!(canonical_path(&project, &project.root_id), "/");
        for node in project.nodes.values() {
            let relative = relative_path(&project, &node.id);
            prop_assert_eq!(find_by_relative_path(&project, &relative), Some(node.id.clone()));
            if let Some(parent) = &node.parent_id {
                prop_assert_eq!(
                    canonical_path(&project, &node.id),
                    join(&canonical_path(&project, parent), &node.name)
                );
            }
        }
    }
}
