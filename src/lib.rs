pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, job_service::JobService,
    notification_service::NotificationService, opleiding_service::OpleidingService,
    user_service::UserService, verification_service::VerificationService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub verification_service: VerificationService,
    pub job_service: JobService,
    pub opleiding_service: OpleidingService,
    pub application_service: ApplicationService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let notification_service = NotificationService::new(
            pool.clone(),
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        );
        let user_service = UserService::new(pool.clone(), notification_service.clone());
        let verification_service =
            VerificationService::new(pool.clone(), notification_service.clone());
        let job_service = JobService::new(pool.clone());
        let opleiding_service = OpleidingService::new(pool.clone());
        let application_service =
            ApplicationService::new(pool.clone(), notification_service.clone());

        Self {
            pool,
            user_service,
            verification_service,
            job_service,
            opleiding_service,
            application_service,
            notification_service,
        }
    }
}
