use tocrawl_tree::{iter::Edge, tree};

#[test]
fn iter_ancestors() {
    let tree = tree!('a' => { 'b' => { 'c' => { 'd' } } });
    let d = tree
        .root()
        .last_child()
        .unwrap()
        .last_child()
        .unwrap()
        .last_child()
        .unwrap();

    assert_eq!(
        vec!['c', 'b', 'a'],
        d.ancestors()
            .filter_map(|nref| nref.map_value(|&c| c))
            .collect::<Vec<_>>()
    );
}

#[test]
fn iter_siblings() {
    let tree = tree!('a' => { 'b', 'c', 'd' });

    assert_eq!(
        vec!['c', 'b'],
        tree.root()
            .last_child()
            .unwrap()
            .prev_siblings()
            .filter_map(|nref| nref.map_value(|&c| c))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        vec!['c', 'd'],
        tree.root()
            .first_child()
            .unwrap()
            .next_siblings()
            .filter_map(|nref| nref.map_value(|&c| c))
            .collect::<Vec<_>>()
    );
}

#[test]
fn iter_children() {
    let tree = tree!('a' => { 'b', 'c', 'd' });

    assert_eq!(
        vec!['b', 'c', 'd'],
        tree.root()
            .children()
            .filter_map(|nref| nref.map_value(|&c| c))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        vec!['d', 'c', 'b'],
        tree.root()
            .children()
            .rev()
            .filter_map(|nref| nref.map_value(|&c| c))
            .collect::<Vec<_>>()
    );
}

#[test]
fn iter_traverse() {
    #[derive(Debug, PartialEq, Eq)]
    enum Value {
        Open(char),
        Close(char),
    }

    let tree = tree!('a' => { 'b' => { 'd', 'e' }, 'c' });

    let traversal = tree
        .root()
        .traverse()
        .filter_map(|edge| match edge {
            Edge::Open(nref) => nref.map_value(|&c| c).map(Value::Open),
            Edge::Close(nref) => nref.map_value(|&c| c).map(Value::Close),
        })
        .collect::<Vec<_>>();

    assert_eq!(
        &[
            Value::Open('a'),
            Value::Open('b'),
            Value::Open('d'),
            Value::Close('d'),
            Value::Open('e'),
            Value::Close('e'),
            Value::Close('b'),
            Value::Open('c'),
            Value::Close('c'),
            Value::Close('a'),
        ],
        &traversal[..]
    );
}

#[test]
fn iter_traverse_is_fused() {
    let tree = tree!('a' => { 'b' });
    let mut traverse = tree.root().traverse();
    assert_eq!(4, traverse.by_ref().count());
    assert!(traverse.next().is_none());
}

#[test]
fn iter_descendants() {
    let tree = tree!('a' => { 'b' => { 'd', 'e' }, 'c' });

    let descendants = tree
        .root()
        .descendants()
        .filter_map(|nref| nref.map_value(|&c| c))
        .collect::<Vec<_>>();

    assert_eq!(&['a', 'b', 'd', 'e', 'c'], &descendants[..]);
}

#[test]
fn iter_descendants_of_subtree() {
    let tree = tree!('a' => { 'b' => { 'd', 'e' }, 'c' });
    let b = tree.root().first_child().unwrap();

    let descendants = b
        .descendants()
        .filter_map(|nref| nref.map_value(|&c| c))
        .collect::<Vec<_>>();

    assert_eq!(&['b', 'd', 'e'], &descendants[..]);
}

#[test]
fn iter_breadth_first() {
    let tree = tree!('a' => { 'b' => { 'd', 'e' => { 'f' } }, 'c' => { 'g' } });

    let levels = tree
        .root()
        .breadth_first()
        .filter_map(|nref| nref.map_value(|&c| c))
        .collect::<Vec<_>>();

    assert_eq!(&['a', 'b', 'c', 'd', 'e', 'g', 'f'], &levels[..]);
}

#[test]
fn iter_restartable() {
    let tree = tree!('a' => { 'b', 'c' });
    let root = tree.root();
    assert_eq!(root.descendants().count(), root.descendants().count());
    assert_eq!(root.breadth_first().count(), 3);
    assert_eq!(root.breadth_first().count(), 3);
}
