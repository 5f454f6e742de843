/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 */
pub mod headers;
pub mod http;
