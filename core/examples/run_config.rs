// accrete/examples/run_config.rs

use accrete::{AccreteResult, ConfigSchemaBuilder, FieldSchema, Update};
use tracing::info;

fn main() -> AccreteResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Run Configuration Example ---");

  // Run-level options use the same schema machinery as workflow state, but
  // are resolved once per run instead of once per step.
  let mut b = ConfigSchemaBuilder::new("run_config");
  let text_only = b.flag("text_only_mode")?;
  let organization_id = b.option("organization_id", FieldSchema::<String>::overwrite())?;
  let config = b.build();

  // Run 1: nothing supplied, defaults apply.
  let options = config.defaults();
  info!(text_only = options.get(&text_only).unwrap(), "run 1 options");
  assert_eq!(options.get(&text_only), Some(&false));
  assert_eq!(options.get(&organization_id), None); // unset, not an error

  // Run 2: explicit values fully replace defaults.
  let options = config.resolve(
    &Update::new()
      .set(&text_only, true)
      .set(&organization_id, "org-42".to_string()),
  )?;
  info!(
    text_only = options.get(&text_only).unwrap(),
    organization = %options.get(&organization_id).unwrap(),
    "run 2 options"
  );
  assert_eq!(options.get(&text_only), Some(&true));

  Ok(())
}
