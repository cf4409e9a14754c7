//! # Identity Demo
//!
//! Walks through identity creation, message exchange and login credentials.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example identity_demo
//! ```

use messenger_core::{CryptoService, Error};

#[tokio::main]
async fn main() {
    println!("=== Messenger Core: Identity Demo ===\n");

    let service = CryptoService::new();
    let password = "hallo123";

    // Step 1: Create an identity
    println!("Step 1: Generating RSA-4096 identity (this takes a moment)...");
    let enrolled = service
        .generate_identity(password)
        .await
        .expect("Failed to generate identity");

    let wrapped = enrolled.wrapped_private_key.encode();
    println!("  Public key (JWK): {}...", &enrolled.public_key.as_str()[..48]);
    println!("  Wrapped private key: {} base64 chars", wrapped.len());
    println!(
        "  PBKDF2 iterations: {}",
        enrolled.wrapped_private_key.iterations()
    );
    println!();

    // Step 2: Someone encrypts a message to us
    println!("Step 2: Encrypting a message to the public key...");
    let ciphertext = service
        .encrypt("testText", &enrolled.public_key)
        .await
        .expect("Failed to encrypt");
    println!("  Ciphertext: {}...", &ciphertext[..48]);
    println!();

    // Step 3: Unwrap with the password and decrypt
    println!("Step 3: Decrypting with the wrapped key and password...");
    let plaintext = service
        .decrypt_with_wrapped_key(&ciphertext, &wrapped, password)
        .await
        .expect("Failed to decrypt");
    println!("  Plaintext: {}", plaintext);

    match service.unwrap(&wrapped, "wrong password").await {
        Err(Error::AuthenticationFailure) => println!("  Wrong password rejected ✓"),
        other => println!("  Unexpected result: {:?}", other.map(|_| ())),
    }
    println!();

    // Step 4: Login credential
    println!("Step 4: Deriving a login credential...");
    let credential = service
        .derive_login_credential(password, None)
        .await
        .expect("Failed to derive credential");
    println!("  Salt: {}", credential.salt().to_base64());
    println!("  Hash: {}", credential.hash_base64());

    let ok = service
        .verify_login_credential(password, &credential)
        .await
        .expect("Failed to verify");
    println!("  Correct password verifies: {}", ok);
    println!();

    // Step 5: Session data under the same salt
    println!("Step 5: Encrypting session data with the password...");
    let sealed = service
        .encrypt_with_password(password, credential.salt(), "testText")
        .await
        .expect("Failed to encrypt session data");
    let opened = service
        .decrypt_with_password(password, credential.salt(), &sealed)
        .await
        .expect("Failed to decrypt session data");
    println!("  Sealed: {}", sealed);
    println!("  Opened: {}", opened);

    println!("\n=== Demo Complete ===");
}
