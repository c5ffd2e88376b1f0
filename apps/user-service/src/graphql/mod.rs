//! GraphQL front end - mirrors the REST behavior over one schema.

mod schema;

use actix_web::{HttpRequest, HttpResponse, web};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

pub use schema::{BearerToken, MutationRoot, QueryRoot, ServiceSchema, build_schema};

use crate::middleware::auth::bearer_token;

/// POST /graphql
///
/// The bearer token (if any) is lifted off the HTTP request here and
/// stashed in the execution context; resolvers authenticate themselves,
/// so a missing header only matters to the operations that need it.
pub async fn graphql(
    schema: web::Data<ServiceSchema>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let token = BearerToken(bearer_token(&http_req).ok());
    schema.execute(req.into_inner().data(token)).await.into()
}

/// GET /graphql - serves the GraphiQL IDE.
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Configure the GraphQL routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/graphql", web::post().to(graphql))
        .route("/graphql", web::get().to(graphiql));
}
