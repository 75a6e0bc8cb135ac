use miette::{IntoDiagnostic, Result};
use vita_val::{console_tracer, copy_assign, move_assign, shared, OwningValue};

fn main() -> Result<()> {
    println!("vita-demo v0.1.0");
    println!();

    let tracer = console_tracer();

    println!("-- scenario 1: construction --");
    let a = shared(OwningValue::new(15, tracer.clone()));
    println!();

    println!("-- scenario 2: copy construction --");
    let b = shared(a.borrow().duplicate());
    println!();

    println!("-- scenario 3: copy assignment onto an existing instance --");
    let c = shared(OwningValue::with_default(tracer.clone()));
    copy_assign(&c, &a);
    println!();

    println!("-- scenario 4: move construction --");
    let d = shared(OwningValue::adopt(&mut a.borrow_mut()));
    println!();

    println!("-- scenario 5: move assignment onto an existing instance --");
    let e = shared(OwningValue::with_default(tracer.clone()));
    move_assign(&e, &b);
    println!();

    println!("-- final states --");
    let moved_in = d.borrow().try_auxiliary().into_diagnostic()?;
    println!(
        "instance {} now owns value = {}, aux = {}",
        d.borrow().id(),
        d.borrow().value(),
        moved_in
    );
    let assigned_in = e.borrow().try_auxiliary().into_diagnostic()?;
    println!(
        "instance {} now owns value = {}, aux = {}",
        e.borrow().id(),
        e.borrow().value(),
        assigned_in
    );
    println!(
        "instance {} was moved from: value = {}, aux = absent",
        a.borrow().id(),
        a.borrow().value()
    );
    println!(
        "instance {} was moved from: value = {}, aux = absent",
        b.borrow().id(),
        b.borrow().value()
    );
    println!();

    Ok(())
}
