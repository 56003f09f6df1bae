use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use windows_node_config::{
    ignition::{Ignition, KUBELET_UNIT_NAME},
    payload::{self, FileInfo, NetworkConfScript},
    telemetry::{self, LogFormat},
    Error,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Windows-relevant args of a rendered worker systemd unit as JSON
    KubeletArgs(KubeletArgsArgs),
    /// Write the kube-apiserver serving CA used by kubelet
    KubeletCa(KubeletCaArgs),
    /// Generate the network configuration script
    NetworkScript(NetworkScriptArgs),
    /// Print SHA256 fingerprints of files as JSON
    Fingerprint(FingerprintArgs),
    /// Fingerprint every tracked payload file
    PayloadManifest(PayloadManifestArgs),
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct KubeletArgsArgs {
    /// Systemd unit to read the ExecStart section from
    #[arg(long, default_value = KUBELET_UNIT_NAME)]
    unit: String,
}

#[derive(Parser, Debug)]
struct KubeletCaArgs {
    /// Destination file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct NetworkScriptArgs {
    /// Cluster service network CIDR
    #[arg(long, env = "SERVICE_NETWORK_CIDR")]
    cluster_cidr: String,

    /// HNS network created by the hybrid overlay
    #[arg(long, env = "HNS_NETWORK_NAME")]
    hns_network: String,

    /// Path of the HNS PowerShell module on the node
    #[arg(long, env = "HNS_MODULE_PATH")]
    hns_module: String,

    /// Path of the CNI config file on the node
    #[arg(long, env = "CNI_CONFIG_PATH")]
    cni_config: String,

    /// Where to write the script; defaults to the payload location
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// Files to fingerprint
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct PayloadManifestArgs {
    /// Directory the payload is mounted under
    #[arg(long, env = "PAYLOAD_ROOT", default_value = "/")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    telemetry::init_logging(args.log_format);

    match args.command {
        Commands::KubeletArgs(args) => run_kubelet_args(args).await,
        Commands::KubeletCa(args) => run_kubelet_ca(args).await,
        Commands::NetworkScript(args) => run_network_script(args),
        Commands::Fingerprint(args) => run_fingerprint(args),
        Commands::PayloadManifest(args) => run_payload_manifest(args),
        Commands::Version => {
            println!("windows-node-config v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn load_ignition() -> Result<Ignition, Error> {
    let client = kube::Client::try_default().await?;
    info!("Connected to Kubernetes cluster");
    Ignition::from_cluster(&client).await
}

async fn run_kubelet_args(args: KubeletArgsArgs) -> Result<(), Error> {
    let ignition = load_ignition().await?;
    let unit_args = ignition.unit_args(&args.unit)?;
    println!("{}", serde_json::to_string_pretty(&unit_args)?);
    Ok(())
}

async fn run_kubelet_ca(args: KubeletCaArgs) -> Result<(), Error> {
    let ignition = load_ignition().await?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, ignition.kubelet_ca_data()).map_err(|e| Error::IoError {
                path: path.clone(),
                source: e,
            })?;
            info!(path = %path.display(), "wrote kubelet CA");
        }
        None => print!("{}", String::from_utf8_lossy(ignition.kubelet_ca_data())),
    }
    Ok(())
}

fn run_network_script(args: NetworkScriptArgs) -> Result<(), Error> {
    match args.output {
        Some(output) => NetworkConfScript::new(
            args.cluster_cidr,
            args.hns_network,
            args.hns_module,
            args.cni_config,
        )
        .write_to(output),
        None => payload::populate_network_conf_script(
            &args.cluster_cidr,
            &args.hns_network,
            &args.hns_module,
            &args.cni_config,
        ),
    }
}

fn run_fingerprint(args: FingerprintArgs) -> Result<(), Error> {
    let infos = args
        .paths
        .iter()
        .map(FileInfo::new)
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&infos)?);
    Ok(())
}

fn run_payload_manifest(args: PayloadManifestArgs) -> Result<(), Error> {
    let manifest = payload::manifest(&args.root)?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
