// Claim Auditor CLI entry point
// Use the `claim-auditor` binary directly: cargo run --bin claim-auditor -- --help

fn main() {
    println!("Claim Auditor - Earnings Call Verification Pipeline");
    println!("\nUsage: claim-auditor [--tickers AAPL,MSFT] [--quarters 2024:1,2024:2] [--steps ingest,extract,verify,analyze]");
    println!("\nExample: cargo run --bin claim-auditor -- --tickers AAPL --steps ingest,verify");
}
