use anyhow::Context;
use zx_rewrite::{
    diagram,
    expr::PhaseExpr,
    graph::*,
    phase::Phase,
    rewrite::{ CancelToken, Matcher },
    rule::Rule,
};

fn print_diagram(diagram: &Diagram) {
    for (id, v) in diagram.vertices() {
        println!("  {:>3}: {:?} {}", id, v.kind, v.phase);
    }
    for (a, b, kind) in diagram.edges() {
        println!("  {:>3} -- {:<3} {:?}", a, b, kind);
    }
}

// Change the color of an X-spider by surrounding it with Hadamard wires.
//
// ∣0⟩ --*-- ...           ∣0⟩ --*--- ...
//       |                       |
// ∣0⟩ --X-- ...    =>     ∣0⟩ --Z--- ...
//                            (H-wires)
fn main() -> anyhow::Result<()> {
    let (lhs, _) = diagram!(
        nodes: {
            i = boundary ( ),
            a = x ( PhaseExpr::var("a") ),
            o = boundary ( ),
        },
        wires: { i -- a -- o },
    )?;
    let (rhs, _) = diagram!(
        nodes: {
            i = boundary ( ),
            a = z ( PhaseExpr::var("a") ),
            o = boundary ( ),
        },
        h_wires: { i -- a -- o },
    )?;
    let rule =
        Rule::new("color change", lhs, rhs)?
        .with_description("X(a) => Z(a) between Hadamard wires");

    // rules can be saved and loaded as JSON
    let json = rule.to_json_pretty()?;
    println!("{}", json);
    let rule = Rule::from_json(&json)?;

    // a CNOT followed by a T gate on the target qubit
    let (diagram, nodes) = diagram!(
        nodes: {
            i0 = boundary ( ),
            i1 = boundary ( ),
            c = z ( Phase::zero() ),
            t = x ( Phase::zero() ),
            g = z ( Phase::pi4() ),
            o0 = boundary ( ),
            o1 = boundary ( ),
        },
        wires: {
            i0 -- c -- o0,
            i1 -- t -- g -- o1,
            c -- t,
        },
    )?;
    println!("initial diagram:");
    print_diagram(&diagram);

    // the X-spider has three legs, but the pattern only two: any of the
    // three can be left out and moved onto a fresh spider
    let cancel = CancelToken::new();
    let matches =
        zx_rewrite::find_matches(&rule, &diagram, None, &cancel)?
        .into_matches()
        .context("search was cancelled")?;
    println!("{} matches", matches.len());

    // restrict to matches that keep the control wire on the rewritten spider
    let anchored: Vec<_> =
        Matcher::new(&rule, &diagram)
        .anchor([nodes["t"], nodes["c"]])
        .matches()?
        .collect();
    println!("{} matches with the control wire attached", anchored.len());

    let m = anchored.first().context("no anchored match")?;
    for (name, value) in m.assignment().iter() {
        println!("{} = {}", name, value);
    }
    let rewritten = zx_rewrite::apply_concrete(&rule, &diagram, m)?;
    println!("rewritten diagram:");
    print_diagram(&rewritten);
    println!(
        "Z = {}, X = {}, edges = {}",
        rewritten.count_z(),
        rewritten.count_x(),
        rewritten.count_edges(),
    );

    Ok(())
}
