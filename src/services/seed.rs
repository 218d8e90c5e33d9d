// src/services/seed.rs
//
// Dados de demonstração, gravados pelos próprios serviços (passam pelas mesmas validações).

use rust_decimal::Decimal;

use crate::{
    config::AppState,
    models::{
        auth::{RegisterUserPayload, Role},
        pessoa::{ClientePayload, FabricantePayload},
        produto::ProdutoPayload,
        venda::VendaPayload,
    },
};

/// Só roda com o armazenamento sem usuários.
pub async fn seed_demo_data(state: &AppState) -> anyhow::Result<()> {
    if state.auth_service.has_users().await? {
        tracing::info!("Seed ignorado: já existem usuários cadastrados");
        return Ok(());
    }

    let usuarios = [
        ("admin", "admin@example.com", "admin123", Role::Admin),
        ("user", "user@example.com", "user123", Role::User),
    ];
    for (username, email, password, role) in usuarios {
        let payload = RegisterUserPayload {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        };
        state.auth_service.register_with_role(payload, role).await?;
    }

    let joao = state
        .cliente_service
        .create(ClientePayload {
            nome: "João Silva".into(),
            telefone: "(61) 99999-9999".into(),
            endereco: "Rua das Flores, 123, Brasília-DF".into(),
            email: "joao.silva@email.com".into(),
            cpf: "529.982.247-25".into(),
            forma_pagamento: "Cartão de Crédito".into(),
            rg: "1234567".into(),
        })
        .await?;

    let maria = state
        .cliente_service
        .create(ClientePayload {
            nome: "Maria Oliveira".into(),
            telefone: "(61) 88888-8888".into(),
            endereco: "Av. Central, 456, Brasília-DF".into(),
            email: "maria.oliveira@email.com".into(),
            cpf: "935.411.347-80".into(),
            forma_pagamento: "Pix".into(),
            rg: "7654321".into(),
        })
        .await?;

    let tech = state
        .fabricante_service
        .create(FabricantePayload {
            nome: "Tech Solutions".into(),
            telefone: "(11) 3333-3333".into(),
            endereco: "Av. Paulista, 1000, São Paulo-SP".into(),
            email: "contato@techsolutions.com".into(),
            razao_social: "Tech Solutions Ltda".into(),
            cnpj: "45.997.418/0001-53".into(),
            contato: "Carlos Mendes".into(),
        })
        .await?;

    let eletronicos = state
        .fabricante_service
        .create(FabricantePayload {
            nome: "Eletrônicos Brasil".into(),
            telefone: "(11) 4444-4444".into(),
            endereco: "Rua Augusta, 500, São Paulo-SP".into(),
            email: "contato@eletronicosbrasil.com".into(),
            razao_social: "Eletrônicos Brasil S.A.".into(),
            cnpj: "75.980.885/0001-31".into(),
            contato: "Ana Souza".into(),
        })
        .await?;

    let produtos = [
        ("Smartphone X", 1200, 2000, "Eletrônicos", tech.id),
        ("Notebook Pro", 3000, 4500, "Informática", tech.id),
        ("Smart TV 50\"", 2000, 3200, "Eletrônicos", eletronicos.id),
    ];
    let mut criados = Vec::with_capacity(produtos.len());
    for (nome, custo, venda, categoria, fabr) in produtos {
        let produto = state
            .produto_service
            .create(ProdutoPayload {
                nome: nome.into(),
                valor_custo: Decimal::from(custo),
                valor_venda: Decimal::from(venda),
                categoria: categoria.into(),
                fabr,
            })
            .await?;
        criados.push(produto);
    }

    let vendas = [
        ("V001", 15, 2000, joao.id, criados[0].id),
        ("V002", 20, 4500, maria.id, criados[1].id),
        ("V003", 25, 3200, joao.id, criados[2].id),
    ];
    for (identificador, dia, total, clnt, prod) in vendas {
        state
            .venda_service
            .create(VendaPayload {
                identificador: identificador.into(),
                dia,
                mes: 6,
                ano: 2025,
                valor_total: Decimal::from(total),
                clnt,
                prod,
            })
            .await?;
    }

    tracing::info!("🌱 Dados de demonstração criados (admin@example.com / admin123, user@example.com / user123)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::query::ListQuery, config::Config, db::Database, db::memory::MemoryStore};

    #[tokio::test]
    async fn seeds_once() {
        let state = AppState::new(Config::for_tests(), Database::Memory(MemoryStore::new()));

        seed_demo_data(&state).await.unwrap();
        seed_demo_data(&state).await.unwrap();

        let (clientes, total) = state.cliente_service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(clientes[0].nome, "João Silva");

        let resumo = state.relatorio_service.resumo_mensal(2025).await.unwrap();
        assert_eq!(resumo.len(), 1);
        assert_eq!(resumo[0].count, 3);
        assert_eq!(resumo[0].total_value, Decimal::from(9700));

        let por_cliente = state.relatorio_service.resumo_por_cliente().await.unwrap();
        assert_eq!(por_cliente[0].client_name, "João Silva");
        assert_eq!(por_cliente[0].total_value, Decimal::from(5200));
    }
}
