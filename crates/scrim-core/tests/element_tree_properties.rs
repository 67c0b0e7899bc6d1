use proptest::prelude::*;
use scrim_core::{Controlled, Document, Element, ElementId, ElementTree};

/// Build a tree from parent choices: node `i` hangs under `parents[i] % (i + 1)`,
/// where 0 is the body and `k > 0` is the `k`-th created element.
fn build(parents: &[usize]) -> (ElementTree, Vec<ElementId>) {
    let mut doc = ElementTree::new();
    let mut nodes = vec![doc.body()];
    for (i, &choice) in parents.iter().enumerate() {
        let parent = nodes[choice % (i + 1)];
        let element = if i % 3 == 0 {
            Element::button()
        } else {
            Element::container()
        };
        nodes.push(doc.create_child(parent, element).unwrap());
    }
    (doc, nodes)
}

proptest! {
    #[test]
    fn descendants_agree_with_contains(parents in prop::collection::vec(any::<usize>(), 1..40)) {
        let (doc, nodes) = build(&parents);
        for &root in &nodes {
            let descendants = doc.descendants(root);
            for &node in &nodes {
                let inside = node != root && descendants.contains(&node);
                prop_assert_eq!(inside, node != root && doc.contains(root, node));
            }
        }
    }

    #[test]
    fn bubble_path_ends_at_body(parents in prop::collection::vec(any::<usize>(), 1..40)) {
        let (doc, nodes) = build(&parents);
        for &node in &nodes {
            let path = doc.bubble_path(node);
            prop_assert_eq!(path.first().copied(), Some(node));
            prop_assert_eq!(path.last().copied(), Some(doc.body()));
            for pair in path.windows(2) {
                prop_assert_eq!(doc.parent(pair[0]), Some(pair[1]));
            }
        }
    }

    #[test]
    fn detach_removes_whole_subtree(
        parents in prop::collection::vec(any::<usize>(), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut doc, nodes) = build(&parents);
        let target = nodes[1..][pick.index(nodes.len() - 1)];
        let subtree = doc.descendants(target);
        doc.detach(target).unwrap();
        prop_assert!(!doc.is_attached(target));
        for node in subtree {
            prop_assert!(!doc.is_attached(node));
        }
    }

    #[test]
    fn external_values_only_change_through_the_owner(
        requests in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        let mut value = Controlled::external(false, |_| {});
        for next in requests {
            prop_assert!(!value.request(next));
            prop_assert!(!*value.get());
        }
    }
}
