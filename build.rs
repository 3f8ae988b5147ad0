fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/sqliterpc.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/sqliterpc.proto"], &["proto"])
        .unwrap_or_else(|e| panic!("Failed to compile protos {:?}", e));
    Ok(())
}
