//! Debug `.dot` rendering of a BDD reachable from a given root.
//!
//! Walks the shared arena via DFS from `root` rather than an index-ordered
//! scan, since a single [`BddManager`] holds many unrelated BDDs at once and
//! only the nodes reachable from `root` belong to the one being rendered.

use std::collections::HashSet;
use std::io::Write;

use super::manager::BddManager;
use super::node::{BddPtr, BddVar};

/// Write `root` to `output` as a `.dot` graph, using `var_name` to label each
/// decision node and (if supplied) `weight` to annotate it with the
/// `(w0, w1)` pair a weighted model count would use at that variable. When
/// `zero_pruned` is set, edges into the `false` terminal are omitted (handy
/// for BDDs that are mostly satisfiable).
pub fn print_bdd_as_dot(
    output: &mut dyn Write,
    manager: &BddManager,
    root: BddPtr,
    var_name: &dyn Fn(u32) -> String,
    weight: Option<&dyn Fn(BddVar) -> Option<(f64, f64)>>,
    zero_pruned: bool,
) -> std::io::Result<()> {
    output.write_all(b"digraph G {\n")?;
    output.write_all(b"init__ [label=\"\", style=invis, height=0, width=0];\n")?;
    output.write_all(format!("init__ -> n{};\n", root.0).as_bytes())?;

    let mut seen: HashSet<BddPtr> = HashSet::new();
    let mut stack = vec![root];
    while let Some(ptr) = stack.pop() {
        if !seen.insert(ptr) {
            continue;
        }
        if ptr.is_terminal() {
            continue;
        }
        let var = manager.node_var(ptr).expect("non-terminal node must have a variable");
        let label = match weight.and_then(|w| w(var)) {
            Some((w0, w1)) => format!("{} ({:.3}/{:.3})", var_name(var.index()), w0, w1),
            None => var_name(var.index()),
        };
        output.write_all(format!("n{}[label=\"{}\"];\n", ptr.0, label).as_bytes())?;
        let high = manager.node_high(ptr);
        if !zero_pruned || !high.is_false() {
            output.write_all(format!("n{} -> n{} [style=filled];\n", ptr.0, high.0).as_bytes())?;
        }
        let low = manager.node_low(ptr);
        if !zero_pruned || !low.is_false() {
            output.write_all(format!("n{} -> n{} [style=dotted];\n", ptr.0, low.0).as_bytes())?;
        }
        stack.push(high);
        stack.push(low);
    }

    if !zero_pruned {
        output.write_all(
            b"n0 [shape=box, label=\"0\", style=filled, height=0.3, width=0.3];\n",
        )?;
    }
    output.write_all(b"n1 [shape=box, label=\"1\", style=filled, height=0.3, width=0.3];\n")?;
    output.write_all(b"}\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_simple_conjunction() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let y = mgr.new_var();
        let vx = mgr.mk_var(x);
        let vy = mgr.mk_var(y);
        let root = mgr.and(vx, vy);

        let mut buf = Vec::new();
        print_bdd_as_dot(&mut buf, &mgr, root, &|v| format!("v{}", v), None, false).unwrap();
        let dot = String::from_utf8(buf).unwrap();
        assert!(dot.starts_with("digraph G {\n"));
        assert!(dot.contains("v0") || dot.contains("v1"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn renders_weight_annotations_when_supplied() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let root = mgr.mk_var(x);

        let mut buf = Vec::new();
        let weight = |_: BddVar| Some((0.7, 0.3));
        print_bdd_as_dot(&mut buf, &mgr, root, &|v| format!("v{}", v), Some(&weight), false).unwrap();
        let dot = String::from_utf8(buf).unwrap();
        assert!(dot.contains("0.700/0.300"));
    }
}
