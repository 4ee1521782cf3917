mod dockerfile;

pub use dockerfile::TeraDockerfileFrontend;
