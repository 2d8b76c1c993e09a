use std::time::Instant;
use anyhow::Context;
use rand::{ thread_rng, Rng };
use zx_rewrite::{
    diagram,
    expr::PhaseExpr,
    graph::*,
    phase::Phase,
    rewrite::{ ApplyError, CancelToken },
    rule::Rule,
};

const N: usize = 200;

fn timeit<F, T>(mut f: F) -> (T, f64)
where F: FnMut() -> T
{
    let t0 = Instant::now();
    let out: T = f();
    (out, (Instant::now() - t0).as_secs_f64())
}

// Z(a) -- Z(b)  =>  Z(a + b)
fn fusion() -> anyhow::Result<Rule> {
    let (lhs, _) = diagram!(
        nodes: {
            i = boundary ( ),
            a = z ( PhaseExpr::var("a") ),
            b = z ( PhaseExpr::var("b") ),
            o = boundary ( ),
        },
        wires: { i -- a -- b -- o },
    )?;
    let (rhs, _) = diagram!(
        nodes: {
            i = boundary ( ),
            ab = z ( "a + b".parse::<PhaseExpr>()? ),
            o = boundary ( ),
        },
        wires: { i -- ab -- o },
    )?;
    Ok(Rule::new("fusion", lhs, rhs)?)
}

// Z(a + b)  =>  Z(a) -- Z(b)
fn unfusion() -> anyhow::Result<Rule> {
    Ok(fusion()?.inverse()?)
}

// Generate a chain of Z-spiders with randomly chosen phases and fuse them all
// together, one rewrite at a time.
fn main() -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let mut diagram = Diagram::new();
    let mut last = diagram.add_vertex(Vertex::boundary());
    let mut total = Phase::zero();
    for k in 0..N {
        let ph = Phase::new(rng.gen_range(0..8), 8);
        total += ph;
        let z = diagram.add_vertex(Vertex::z(ph).at(k as f64 + 1.0, 0.0));
        diagram.add_edge(last, z, EdgeKind::Plain)?;
        last = z;
    }
    let o = diagram.add_vertex(Vertex::boundary().at(N as f64 + 1.0, 0.0));
    diagram.add_edge(last, o, EdgeKind::Plain)?;

    let fuse = fusion()?;
    let cancel = CancelToken::new();
    println!("# spiders = {}", N);
    print!("fuse all spiders ... ");
    let (res, t) = timeit(|| -> anyhow::Result<usize> {
        let mut steps = 0;
        loop {
            let outcome = fuse.find_matches(&diagram, None, &cancel)?;
            let matches = outcome.matches().context("search was cancelled")?;
            let Some(m) = matches.first() else { break; };
            diagram = fuse.apply(&diagram, m)?;
            steps += 1;
        }
        Ok(steps)
    });
    println!("{:.3} secs", t);
    println!("{} rewrites", res?);

    let (_, spider) =
        diagram.vertices().find(|(_, v)| v.is_z())
        .context("no spider left")?;
    println!("final phase = {}, expected {}", spider.phase, total);

    // read backwards, fusion leaves one of its variables undetermined
    let split = unfusion()?;
    let matches =
        split.find_matches(&diagram, None, &cancel)?
        .into_matches()
        .context("search was cancelled")?;
    let m = matches.first().context("no match")?;
    for (name, value) in m.assignment().iter() {
        println!("{} = {}", name, value);
    }
    match zx_rewrite::apply_concrete(&split, &diagram, m) {
        Err(ApplyError::UnresolvedSymbolicPhase(name)) => {
            println!("'{}' has no concrete value; keeping it symbolic", name);
        },
        res => { res?; },
    }
    let symbolic = split.apply(&diagram, m)?;
    println!("free variables after splitting: {:?}", symbolic.free_vars());

    Ok(())
}
