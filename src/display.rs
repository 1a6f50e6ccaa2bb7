use std::collections::HashSet;
use std::time::Duration;

use crate::types::{Listing, Strategy};

/// One row of the compare-mode report
pub struct StrategyTiming {
    pub strategy: Strategy,
    pub elapsed: Duration,
    pub outcome: Result<usize, String>,
}

/// Display a preview of the aggregated listings
pub fn display_listing_table(listings: &[Listing]) {
    if listings.is_empty() {
        println!("No listings to display");
        return;
    }

    println!("\n{}", "=".repeat(72));
    println!("                       AGGREGATED LISTINGS PREVIEW");
    println!("{}", "=".repeat(72));

    println!(
        "{:<10} {:<12} {:<12} {:>6} {:>12}",
        "Id", "Make", "Model", "Year", "Price"
    );
    println!("{}", "-".repeat(72));

    println!("=== FIRST 10 ROWS ===");
    for listing in listings.iter().take(10) {
        print_row(listing);
    }

    if listings.len() > 10 {
        println!("\n=== LAST 10 ROWS ===");
        for listing in listings.iter().rev().take(10).rev() {
            print_row(listing);
        }
    }

    println!("{}", "=".repeat(72));
    println!("Total rows: {}", listings.len());

    let avg_price: f64 = listings.iter().map(|l| l.price).sum::<f64>() / listings.len() as f64;
    let min_year = listings.iter().map(|l| l.year).min().unwrap_or(0);
    let max_year = listings.iter().map(|l| l.year).max().unwrap_or(0);
    let makes: HashSet<&str> = listings.iter().map(|l| l.make.as_str()).collect();

    println!("Average Price: {:.2}", avg_price);
    println!("Year Range: {}-{}", min_year, max_year);
    println!("Distinct Makes: {}", makes.len());
    println!("{}", "=".repeat(72));
}

fn print_row(listing: &Listing) {
    println!(
        "{:<10} {:<12} {:<12} {:>6} {:>12.2}",
        listing.id, listing.make, listing.model, listing.year, listing.price
    );
}

/// Display the wall-clock comparison across strategies
pub fn display_timing_table(report: &[StrategyTiming]) {
    println!("\n{}", "=".repeat(72));
    println!("                       STRATEGY TIMING COMPARISON");
    println!("{}", "=".repeat(72));
    println!("{:<22} {:>12}  {}", "Strategy", "Elapsed", "Outcome");
    println!("{}", "-".repeat(72));

    for row in report {
        let outcome = match &row.outcome {
            Ok(count) => format!("{} listings", count),
            Err(e) => format!("failed: {}", e),
        };
        println!(
            "{:<22} {:>12}  {}",
            row.strategy.to_string(),
            format!("{:.1?}", row.elapsed),
            outcome
        );
    }

    println!("{}", "=".repeat(72));
}
