//! Debug route resolution.

use siteulation_client::screens;

/// Resolve a path against the application route table and print the
/// outcome.
pub fn run(path: &str) -> siteulation_client::Result<()> {
    let table = screens::route_table()?;

    match table.resolve(path) {
        Some(matched) => {
            println!("{path} -> {:?}", matched.handler);
            for name in ["username", "slug"] {
                if let Some(value) = matched.params.get(name) {
                    println!("  {name} = {value}");
                }
            }
        }
        None => println!("{path} -> not found"),
    }

    Ok(())
}
