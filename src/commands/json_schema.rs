use crate::domain::FormSchema;

pub fn handle() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(FormSchema);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
