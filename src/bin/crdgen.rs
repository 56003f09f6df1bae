use kube::CustomResourceExt;
use windows_node_config::crd::{ControllerConfig, MachineConfig};

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&MachineConfig::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&ControllerConfig::crd())?);
    Ok(())
}
