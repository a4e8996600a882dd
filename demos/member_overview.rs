//! Example: read cooperative state and watch a member's position
//!
//! This example fetches cooperative-wide totals and, for a given member
//! address, the full dashboard snapshot.

use alloy_primitives::Address;
use sacco_client::dashboard::CooperativeOverview;
use sacco_client::{ClientConfig, ContractDescriptor, SaccoClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("sacco_client=info")
        .init();

    println!("=== Sacco Cooperative Client Example ===\n");

    // Configure for the Citrea testnet deployment. Replace the zero address
    // with a real deployment address.
    let config = ClientConfig::testnet();
    println!("Network: {:?}", config.network);
    println!("RPC URL: {}\n", config.rpc_url);

    let contract = ContractDescriptor::new(Address::ZERO, config.chain_id);
    let client = SaccoClient::new(config, contract)?;
    println!("✓ Sacco client initialized\n");

    // Perform health check
    println!("Performing health check...");
    match client.health_check().await {
        Ok(_) => println!("✓ Health check passed\n"),
        Err(e) => {
            eprintln!("✗ Health check failed: {}\n", e);
            return Err(e.into());
        }
    }

    // Cooperative-wide figures
    println!("Fetching cooperative overview...");
    match CooperativeOverview::load(&client).await {
        Ok(overview) => {
            println!("✓ Overview:");
            println!("  - Total shares: {}", overview.totals.total_shares);
            println!("  - Total savings: {}", overview.totals.total_savings);
            println!("  - Proposals: {}", overview.totals.total_proposals);
            println!("  - Active board seats: {}\n", overview.active_board().count());
        }
        Err(e) => {
            eprintln!("✗ Failed to fetch overview: {}\n", e);
        }
    }

    // Example: load one member's dashboard (replace with a real member)
    // Uncomment to test with a real member address:
    /*
    use sacco_client::dashboard::MemberDashboard;
    let member: Address = "0xYourMemberAddress".parse()?;
    println!("Loading dashboard for {}", member);
    match MemberDashboard::load(&client, member).await {
        Ok(dashboard) => {
            let standing = dashboard.standing();
            println!("✓ Member standing:");
            println!("  - Active: {}", standing.active);
            println!("  - Shares: {}", standing.shares);
            println!("  - Savings: {}", standing.savings);
            println!("  - Outstanding debt: {}", standing.outstanding_debt);
            println!("  - Guarantee capacity: {}", standing.guarantee_capacity);
        }
        Err(e) => {
            eprintln!("✗ Failed to load dashboard: {}", e);
        }
    }
    */

    // Writes require a connected signer:
    //
    // client.session().connect(my_signer);
    // let handle = client.purchase_shares(5).await?;
    // match handle.wait().await? { ... }

    println!("Example completed successfully!");
    Ok(())
}
