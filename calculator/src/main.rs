use calculator::{add, divide, multiply, CalcError, Calculator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), CalcError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("Testing calculator functions:");
    println!("5 + 3 = {}", add(5.0, 3.0));
    println!("4 * 7 = {}", multiply(4.0, 7.0));
    println!("10 / 2 = {}", divide(10.0, 2.0)?);

    println!("\nTesting Calculator:");
    let mut calc = Calculator::new();
    let r1 = calc.calculate("add", 15.0, 25.0)?;
    let r2 = calc.calculate("multiply", 6.0, 8.0)?;
    let r3 = calc.calculate("divide", 20.0, 4.0)?;

    println!("Results: {r1}, {r2}, {r3}");
    println!("History:");
    for entry in calc.history() {
        println!("  {entry}");
    }
    Ok(())
}
