pub mod recon_pipeline;
