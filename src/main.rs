//! Demo node: producers, miner, and SPV clients in one process
//!
//! Spawns a few transaction producers feeding the pool, runs the miner
//! for a configured number of blocks, and registers one headers-only
//! client per account so every mined block is SPV-verified as it is
//! broadcast. Exits once the requested blocks are mined, printing the
//! proof for a transaction in the final block.

use std::sync::Arc;
use std::thread;

use clap::Parser;
use log::{error, info};
use rand::Rng;

use pow_ledger::crypto::hash::sha256_hex;
use pow_ledger::{
    FullNode, HeaderSink, Miner, Network, SpvClient, TransactionOutput, Wallet,
    DEFAULT_BATCH_CAPACITY, DEFAULT_DIFFICULTY_PREFIX, UTXO,
};

#[derive(Parser)]
#[command(name = "pow-ledger")]
#[command(version = "0.1.0")]
#[command(about = "A minimal proof-of-work UTXO ledger with SPV proofs", long_about = None)]
struct Cli {
    /// Transactions per block (pool capacity)
    #[arg(short, long, default_value_t = DEFAULT_BATCH_CAPACITY)]
    batch_size: usize,

    /// Hex prefix a solved block hash must start with
    #[arg(short = 'p', long, default_value = DEFAULT_DIFFICULTY_PREFIX)]
    difficulty_prefix: String,

    /// Number of blocks to mine before exiting
    #[arg(short = 'n', long, default_value_t = 2)]
    blocks: u64,

    /// Concurrent transaction producers
    #[arg(long, default_value_t = 2)]
    producers: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let network = Arc::new(Network::new(cli.batch_size));

    // One account per producer plus a shared recipient, each watched by
    // its own headers-only client.
    let wallets: Vec<Arc<Wallet>> = (0..cli.producers + 1)
        .map(|i| Arc::new(Wallet::with_label(&format!("account-{}", i))))
        .collect();

    let clients: Vec<Arc<SpvClient>> = wallets
        .iter()
        .map(|wallet| {
            let client = Arc::new(SpvClient::new(&wallet.address()));
            network.register_client(Arc::clone(&client) as Arc<dyn HeaderSink>);
            client
        })
        .collect();

    for (i, wallet) in wallets.iter().take(cli.producers).enumerate() {
        let network = Arc::clone(&network);
        let wallet = Arc::clone(wallet);
        let recipient = wallets[(i + 1) % wallets.len()].address();
        thread::spawn(move || produce(network, wallet, recipient));
    }

    let miner = Miner::new(Arc::clone(&network), &cli.difficulty_prefix);
    miner.run(cli.blocks);

    let (height, sample_hash) = {
        let chain = network.chain().read().expect("chain lock poisoned");
        let sample = chain
            .latest_block()
            .body
            .transactions
            .first()
            .map(|tx| tx.hash());
        (chain.height(), sample)
    };
    info!("final chain height: {}", height);

    for (wallet, client) in wallets.iter().zip(&clients) {
        info!(
            "[{}] {} holds {} header(s)",
            wallet.label.as_deref().unwrap_or("account"),
            client.address(),
            client.header_count()
        );
    }

    if let Some(tx_hash) = sample_hash {
        if let Some(proof) = network.build_proof(&tx_hash) {
            match serde_json::to_string_pretty(&proof) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("could not serialize proof: {}", e),
            }
        }
    }
}

/// Keep handing pre-signed transfers to the pool, blocking whenever the
/// pool is full. Runs until the process exits with the miner.
fn produce(network: Arc<Network>, wallet: Arc<Wallet>, recipient: String) {
    let mut rng = rand::thread_rng();

    for round in 0u32.. {
        let amount: u64 = rng.gen_range(1..=1_000);

        // Funding outpoints are synthetic: outpoint selection and balance
        // accounting belong to the account collaborator, and the miner
        // checks signatures, not spendability.
        let funding = UTXO {
            tx_id: sha256_hex(format!("{}-{}", wallet.address(), round).as_bytes()),
            output_index: 0,
            output: TransactionOutput {
                amount,
                recipient: wallet.address(),
            },
        };

        match wallet.transfer(&[funding], &recipient, amount, 0) {
            Ok(tx) => network.submit(tx),
            Err(e) => {
                error!("producer stopped: {}", e);
                return;
            }
        }
    }
}
