//! Property-based tests for edit sessions

use canopy_core::Tree;
use canopy_session::{CommitOutcome, EditSession, SessionConfig};
use proptest::prelude::*;
use tempfile::tempdir;

fn arbitrary_paths() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::collection::vec("[a-c]", 1..4), 0..15)
        .prop_map(|paths| paths.into_iter().map(|segments| segments.join("/")).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: after a commit the file on disk equals the committed tree
    #[test]
    fn committed_tree_matches_disk(
        initial in arbitrary_paths(),
        added in arbitrary_paths(),
        cancel_first in any::<bool>()
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playlist.txt");

        let mut tree = Tree::new();
        for item in &initial {
            tree.insert_item(item).unwrap();
        }
        tree.save(&path).unwrap();

        let mut session = EditSession::new(tree.clone(), &path, SessionConfig::default());
        if cancel_first {
            session.enter().unwrap();
            session.clear().unwrap();
            session.cancel();
            prop_assert_eq!(session.tree(), &tree);
        }

        session.enter().unwrap();
        for item in &added {
            session.insert_item(item).unwrap();
        }
        let changed = !session.no_changes();
        let outcome = session.commit().unwrap();

        prop_assert_eq!(changed, outcome != CommitOutcome::Unchanged);
        prop_assert!(!session.is_editing());
        prop_assert_eq!(&Tree::load(&path).unwrap(), session.tree());
    }
}
