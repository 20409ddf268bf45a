// Run the built-in checks against an image and publish attestations
//
// Keys are PKCS#8 PEM private keys, one per check that should attest:
//   openssl genpkey -algorithm EC -pkeyopt ec_paramgen_curve:P-256 -out diy.pem
//
// GRAFEAS_URL overrides the Container Analysis endpoint, GRAFEAS_TOKEN supplies a
// bearer token and VALID_REPOS is a comma separated list for the diy check.

use binauthz_voucher::{
    check_image, default_registry, Config, Engine, GrafeasClient, GrafeasMetadataClient,
    KeyRing, Result, StaticToken,
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <image@digest> <project> [check=key.pem ...]", args[0]);
        eprintln!("\nExample:");
        eprintln!(
            "  {} gcr.io/team/app@sha256:8c73...27 my-project diy=diy.pem",
            args[0]
        );
        std::process::exit(1);
    }

    let reference = &args[1];
    let mut config = Config::default();
    config.grafeas.project = args[2].clone();
    if let Ok(url) = env::var("GRAFEAS_URL") {
        config.grafeas.base_url = url;
    }
    if let Ok(repos) = env::var("VALID_REPOS") {
        config.engine.valid_repos = repos.split(',').map(|r| r.trim().to_string()).collect();
    }
    config.validate()?;

    let key_files: Vec<(String, String)> = args[3..]
        .iter()
        .filter_map(|arg| arg.split_once('='))
        .map(|(check, path)| (check.to_string(), path.to_string()))
        .collect();
    let keyring = KeyRing::from_pem_files(key_files).await?;
    let attest = !keyring.is_empty();

    let metadata = match env::var("GRAFEAS_TOKEN") {
        Ok(token) => {
            let store = GrafeasClient::new(&config.grafeas)?
                .with_auth(Arc::new(StaticToken::new(token)));
            GrafeasMetadataClient::new(store, config.poll.clone())
        }
        Err(_) => GrafeasMetadataClient::from_config(&config.grafeas, config.poll.clone())?,
    }
    .with_signer(Arc::new(keyring));

    let registry = Arc::new(default_registry(&config.engine));
    let engine = Engine::new(registry, config.engine.clone())
        .with_metadata_client(Arc::new(metadata));

    println!("🔍 Checking image: {}", reference);
    println!("📝 Publishing attestations: {}", attest);
    println!();

    let names = engine.registry().names();
    let response = check_image(&engine, reference, &names, attest).await?;
    engine.close();

    for result in &response.results {
        let mark = if result.success { "✅" } else { "❌" };
        println!("{} {} (attested: {})", mark, result.name, result.attested);
        if let Some(error) = &result.error {
            println!("   {}", error);
        }
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
