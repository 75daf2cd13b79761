//! Basic usage of pathkv: a root, one path node, a few leaves.

use pathkv::{Error, PathTree, RECORD_BYTES};

fn main() -> Result<(), Error> {
    example_nodes()?;
    example_leaves()?;
    Ok(())
}

fn example_nodes() -> Result<(), Error> {
    println!("=== Path nodes ===\n");

    let mut tree = PathTree::new();
    let root = tree.root();

    println!("Root tag: {:?}", tree.tag(root.record()));
    println!("Root id: {:?}", root);
    println!("Record size: {} bytes", RECORD_BYTES);

    let node = tree.create_node(root, b"users")?;
    println!("New node tag: {:?}", tree.tag(node.record()));
    if let Some(created) = tree.node(node) {
        println!("New node parent: {:?}", created.parent());
        println!(
            "New node path: '{}'",
            String::from_utf8_lossy(created.path_segment())
        );
    }

    let freed = tree.release_subtree(node)?;
    println!("Released {} record(s), {} left\n", freed, tree.len());
    Ok(())
}

fn example_leaves() -> Result<(), Error> {
    println!("=== Leaf chains ===\n");

    let mut tree = PathTree::new();
    let users = tree.create_node(tree.root(), b"users")?;
    let ids = tree.create_node(users, b"ids")?;

    tree.create_leaf(ids, b"alice", b"1001")?;
    tree.create_leaf(ids, b"bob", b"1002")?;
    tree.create_leaf(ids, b"carol", b"1003")?;

    let path: Vec<_> = tree
        .path_of(ids)?
        .into_iter()
        .map(String::from_utf8_lossy)
        .collect();
    println!("Path: /{}", path.join("/"));

    for leaf in tree.leaves(ids)? {
        let (id, leaf) = leaf?;
        println!(
            "{:?}: {} = {}",
            id,
            String::from_utf8_lossy(leaf.key()),
            String::from_utf8_lossy(leaf.value())
        );
    }

    let bob = tree.find_leaf(ids, b"bob")?;
    println!("bob found: {}", bob.is_some());
    println!("Tail: {:?}", tree.find_tail(ids)?);
    println!("Stats: {:?}", tree.memory_usage());
    Ok(())
}
