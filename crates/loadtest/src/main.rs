use goose::prelude::*;
use serde_json::json;
use std::env;

fn cpf() -> String {
    env::var("CPF").unwrap_or_else(|_| "12345678900".to_string())
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

async fn mint_token(user: &mut GooseUser) -> TransactionResult {
    let payload = json!({ "cpf": cpf() });
    let _goose_metrics = user.post_json("/api/auth/token", &payload).await?;
    Ok(())
}

async fn login(user: &mut GooseUser) -> TransactionResult {
    let password = env::var("PASSWORD").unwrap_or_else(|_| "secret1".to_string());
    let payload = json!({ "cpf": cpf(), "password": password });
    let _goose_metrics = user.post_json("/api/auth/login", &payload).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    if env::var("CPF").is_err() {
        println!("No CPF environment variable set, defaulting to '12345678900'");
    }

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(
            scenario!("AuthFlows")
                .register_transaction(transaction!(mint_token))
                .register_transaction(transaction!(login)),
        )
        .execute()
        .await?;

    Ok(())
}
