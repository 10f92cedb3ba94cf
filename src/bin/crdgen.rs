//! Prints the `Input` CustomResourceDefinition as YAML.

use irsa_function::crd::Input;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Input::crd())?);
    Ok(())
}
