#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use super::*;
use crate::{entities::Recipe, test_utils::*};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use tower::ServiceExt;

async fn test_app() -> Result<(Router, DatabaseConnection)> {
    init_test_tracing();
    let db = setup_test_db().await?;
    let app = router(AppState::new(db.clone(), Settings::default()))?;
    Ok((app, db))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body, cookie)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers and logs in a user, returning the `name=value` cookie pair.
async fn login_cookie(app: &Router) -> String {
    let (status, _, _) = send(
        app,
        json_request(
            "POST",
            "/auth/registrarse",
            None,
            &json!({"nombre": "Ana", "email": "ana@example.com", "password": "secreto"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, cookie) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"email": "ana@example.com", "password": "secreto"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"]["email"], "ana@example.com");
    assert!(body["usuario"].get("password_hash").is_none());

    let cookie = cookie.unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_root_is_public() -> Result<()> {
    let (app, _db) = test_app().await?;
    let (status, body, _) = send(&app, get_request("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Backend Sweetland funcionando");
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_session() -> Result<()> {
    let (app, _db) = test_app().await?;

    let (status, body, _) = send(&app, get_request("/productos/", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _, _) = send(
        &app,
        get_request("/recetas/", Some("sweetland_session=forged")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() -> Result<()> {
    let (app, _db) = test_app().await?;
    login_cookie(&app).await;

    let (status, body, cookie) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"email": "ana@example.com", "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
    assert!(cookie.is_none());
    Ok(())
}

#[tokio::test]
async fn test_recipe_flow_updates_production_cost() -> Result<()> {
    let (app, _db) = test_app().await?;
    let cookie = login_cookie(&app).await;
    let cookie = Some(cookie.as_str());

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/productos/",
            cookie,
            &json!({"nombre": "Torta", "categoria": "tortas", "precio": 10.0, "costo_produccion": 99.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = body["id_producto"].as_i64().unwrap();

    let mut ingredient_ids = Vec::new();
    for (name, cost) in [("Harina", 1.5), ("Azucar", 3.0)] {
        let (status, body, _) = send(
            &app,
            json_request(
                "POST",
                "/ingredientes/",
                cookie,
                &json!({"nombre": name, "unidad": "kg", "costo_unitario": cost}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ingredient_ids.push(body["id_ingrediente"].as_i64().unwrap());
    }

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/recetas/multiple",
            cookie,
            &json!({
                "id_producto": product_id,
                "ingredientes": [
                    {"id_ingrediente": ingredient_ids[0], "cantidad_necesaria": 2},
                    {"id_ingrediente": ingredient_ids[1], "cantidad_necesaria": 1}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ids_receta"].as_array().unwrap().len(), 2);

    let (status, body, _) = send(
        &app,
        get_request(&format!("/productos/{product_id}"), cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["costo_produccion"], 6.0);

    let (status, body, _) = send(
        &app,
        get_request(&format!("/recetas/costo-produccion/{product_id}"), cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id_producto"], product_id);
    assert_eq!(body["costo_produccion"], 6.0);

    let (status, body, _) = send(
        &app,
        get_request(&format!("/recetas/producto/{product_id}"), cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recetas"].as_array().unwrap().len(), 2);
    assert_eq!(body["costos"]["margen_bruto"], 4.0);
    assert_eq!(body["costos"]["margen_porcentaje"], 40.0);
    Ok(())
}

#[tokio::test]
async fn test_failed_bulk_create_leaves_nothing() -> Result<()> {
    let (app, db) = test_app().await?;
    let cookie = login_cookie(&app).await;
    let product = create_test_product(&db, "Producto 20").await?;
    let flour = create_test_ingredient(&db, "Harina", Some(1.0)).await?;

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/recetas/multiple",
            Some(&cookie),
            &json!({
                "id_producto": product.id,
                "ingredientes": [
                    {"id_ingrediente": flour.id, "cantidad_necesaria": 1},
                    {"id_ingrediente": 9999, "cantidad_necesaria": 1}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Ingredient not found: 9999");
    assert_eq!(Recipe::find().count(&db).await?, 0);

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/recetas/multiple",
            Some(&cookie),
            &json!({"id_producto": product.id, "ingredientes": []}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() -> Result<()> {
    let (app, _db) = test_app().await?;
    let cookie = login_cookie(&app).await;

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/recetas/",
            Some(&cookie),
            &json!({"cantidad_necesaria": "dos"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("cantidad_necesaria")
    );

    let request = Request::builder()
        .method("POST")
        .uri("/productos/")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"nombre\": "))
        .unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::from(r#"{"email": "ana@example.com"}"#))
        .unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_failed_cost_update_answers_generic_error() -> Result<()> {
    let (app, db) = test_app().await?;
    let cookie = login_cookie(&app).await;
    let product = create_test_product(&db, "Torta grande").await?;
    let flour = create_test_ingredient(&db, "Harina", Some(10.0)).await?;
    db.execute_unprepared(
        "CREATE TRIGGER cost_ceiling BEFORE UPDATE OF production_cost ON products \
         WHEN NEW.production_cost > 100 BEGIN SELECT RAISE(ABORT, 'cost ceiling'); END",
    )
    .await?;

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/recetas/",
            Some(&cookie),
            &json!({"id_producto": product.id, "id_ingrediente": flour.id, "cantidad_necesaria": 50}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(Recipe::find().count(&db).await?, 0);

    let (_, body, _) = send(
        &app,
        get_request(&format!("/productos/{}", product.id), Some(&cookie)),
    )
    .await;
    assert_eq!(body["costo_produccion"], 0.0);
    Ok(())
}

#[tokio::test]
async fn test_cost_endpoint_unknown_product() -> Result<()> {
    let (app, _db) = test_app().await?;
    let cookie = login_cookie(&app).await;

    let (status, _, _) = send(
        &app,
        get_request("/recetas/costo-produccion/424242", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_order_status_endpoint() -> Result<()> {
    let (app, _db) = test_app().await?;
    let cookie = login_cookie(&app).await;
    let cookie = Some(cookie.as_str());

    let (status, body, _) = send(
        &app,
        json_request("POST", "/pedidos/", cookie, &json!({"total": 15.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["id_pedido"].as_i64().unwrap();

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/pedidos/{order_id}/estado"),
            cookie,
            &json!({"estado": "enviado"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/pedidos/{order_id}/estado"),
            cookie,
            &json!({"estado": "confirmado"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "confirmado");

    let (status, body, _) = send(&app, get_request("/pedidos/", cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["estado"], "confirmado");
    assert_eq!(body[0]["cliente_nombre"], "Cliente no registrado");
    assert_eq!(body[0]["direccion"], "Sin dirección");
    Ok(())
}

#[tokio::test]
async fn test_logout_ends_session() -> Result<()> {
    let (app, _db) = test_app().await?;
    let cookie = login_cookie(&app).await;

    let (status, _, set_cookie) = send(&app, get_request("/auth/logout", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().contains("Max-Age=0"));

    let (status, _, _) = send(&app, get_request("/usuarios/", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend() -> Result<()> {
    let (app, _db) = test_app().await?;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/productos/")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
    Ok(())
}
