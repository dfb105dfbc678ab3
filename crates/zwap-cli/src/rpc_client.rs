use anyhow::{bail, Context};

use zwap_core::types::Balance;

/// Minimal JSON-RPC client for the chain's public API. Only the gas price
/// oracle is needed; submission is left to the wallet.
pub struct ChainRpcClient {
    url: String,
    client: reqwest::Client,
}

impl ChainRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let body = serde_json::json!({
            "id": "1",
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to {}", self.url))?;

        let json: serde_json::Value = resp.json().await.context("parsing RPC response")?;

        if let Some(err) = json.get("error") {
            bail!("RPC error from {}: {}", self.url, err);
        }

        Ok(json["result"].clone())
    }

    /// Current network minimum gas price in Qa.
    pub async fn get_minimum_gas_price(&self) -> anyhow::Result<Balance> {
        let result = self
            .call("GetMinimumGasPrice", serde_json::json!([""]))
            .await?;

        let price = result
            .as_str()
            .context("expected string gas price from GetMinimumGasPrice")?;
        price.parse().context("parsing minimum gas price")
    }
}
